//! Depth partition: which branch a directory is processed by

use serde::Serialize;
use std::fmt;

/// The branch a directory falls into. Exactly one applies to every directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Nested below a subtree root; covered by that root's archive
    Skip,
    /// Above the boundary with direct files: archive those files
    BundleLeaf,
    /// Above the boundary without direct files: nothing to do
    EmptyLeaf,
    /// At the boundary: archive the whole subtree
    SubtreeRoot,
}

impl Decision {
    /// Classify a directory from its depth and whether it has direct data files
    pub fn classify(depth: usize, archive_depth: usize, has_files: bool) -> Self {
        use std::cmp::Ordering;
        match archive_depth.cmp(&depth) {
            Ordering::Less => Decision::Skip,
            Ordering::Equal => Decision::SubtreeRoot,
            Ordering::Greater if has_files => Decision::BundleLeaf,
            Ordering::Greater => Decision::EmptyLeaf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Skip => "skip",
            Decision::BundleLeaf => "bundle_leaf",
            Decision::EmptyLeaf => "empty_leaf",
            Decision::SubtreeRoot => "subtree_root",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
