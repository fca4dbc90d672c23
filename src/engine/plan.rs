//! Depth partition preview: decisions only, no fingerprints, no writes

use crate::engine::policy::Decision;
use crate::engine::report::DirectoryFailure;
use crate::tree::walker::{Walker, WalkerConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A directory and the branch it falls into
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedDirectory {
    pub path: PathBuf,
    pub depth: usize,
    pub decision: Decision,
    /// Direct data files (checksum artifact excluded)
    pub files: usize,
}

/// Classify every directory the pass would visit
///
/// Walks exactly like a pass, pruning below skipped directories.
pub fn plan_partition(
    source_root: &Path,
    archive_depth: usize,
    walker_config: &WalkerConfig,
) -> (Vec<PlannedDirectory>, Vec<DirectoryFailure>) {
    let mut planned = Vec::new();
    let mut failures = Vec::new();

    let walker = Walker::with_config(source_root.to_path_buf(), walker_config.clone());
    let mut walk = walker.directories();
    while let Some(item) = walk.next() {
        let node = match item {
            Ok(node) => node,
            Err(failure) => {
                if failures.last().map(|f: &DirectoryFailure| &f.path) == Some(&failure.path) {
                    continue;
                }
                failures.push(DirectoryFailure {
                    path: failure.path,
                    decision: None,
                    error: failure.error.to_string(),
                });
                continue;
            }
        };

        let files = node.data_file_count(&walker_config.excluded_file_name);
        let decision = Decision::classify(node.depth, archive_depth, files > 0);
        if decision == Decision::Skip {
            walk.prune();
        }
        planned.push(PlannedDirectory {
            path: node.path,
            depth: node.depth,
            decision,
            files,
        });
    }

    (planned, failures)
}
