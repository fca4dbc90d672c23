//! Filesystem walker for traversing directory structures
//!
//! Two views of the source tree are provided:
//! - [`DirectoryWalk`]: top-down, one [`TraversalNode`] per directory, children
//!   visited in file-name order, with pruning of the current directory.
//! - [`subtree_entries`]: every file and directory below a root, sorted by
//!   archive-relative name, used for subtree fingerprints and subtree archives.

use crate::checksum;
use crate::error::StorageError;
use crate::tree::path;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Filesystem walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false for determinism)
    pub follow_symlinks: bool,
    /// Checksum artifact name, excluded along with its temp file
    pub excluded_file_name: String,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            excluded_file_name: "checksum.txt".to_string(),
        }
    }
}

/// A directory visited by the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalNode {
    pub path: PathBuf,
    /// Direct regular files, sorted by name. May contain the checksum artifact.
    pub files: Vec<OsString>,
    /// Separator count relative to the walk root (root = 0)
    pub depth: usize,
}

impl TraversalNode {
    /// Direct files other than the checksum artifact and its temp file
    pub fn data_file_count(&self, artifact_name: &str) -> usize {
        self.files
            .iter()
            .filter(|name| !checksum::is_artifact_file(name, artifact_name))
            .count()
    }
}

/// A directory the walk could not read
#[derive(Debug)]
pub struct WalkFailure {
    pub path: PathBuf,
    pub error: StorageError,
}

/// Kind of an entry below a subtree root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A file or directory below a subtree root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreeEntry {
    pub path: PathBuf,
    /// `/`-separated name relative to the subtree root
    pub relative: String,
    pub kind: EntryKind,
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Start a top-down directory walk
    pub fn directories(&self) -> DirectoryWalk {
        let inner = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter();
        DirectoryWalk {
            inner,
            follow_symlinks: self.config.follow_symlinks,
        }
    }
}

/// Iterator over the directories of a tree, parents before children
pub struct DirectoryWalk {
    inner: walkdir::IntoIter,
    follow_symlinks: bool,
}

impl DirectoryWalk {
    /// Do not descend into the directory most recently yielded.
    pub fn prune(&mut self) {
        self.inner.skip_current_dir();
    }
}

impl Iterator for DirectoryWalk {
    type Item = Result<TraversalNode, WalkFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    return Some(Err(WalkFailure {
                        path,
                        error: err.into(),
                    }));
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path().to_path_buf();
            let depth = entry.depth();
            return Some(match list_files(&path, self.follow_symlinks) {
                Ok(files) => Ok(TraversalNode { path, files, depth }),
                Err(error) => Err(WalkFailure { path, error }),
            });
        }
    }
}

/// Direct regular files of `dir`, sorted by name
pub fn list_files(dir: &Path, follow_symlinks: bool) -> Result<Vec<OsString>, StorageError> {
    let mut files = Vec::new();
    let read_dir = fs::read_dir(dir).map_err(|e| StorageError::read(dir, e))?;
    for entry in read_dir {
        let entry = entry.map_err(|e| StorageError::read(dir, e))?;
        let file_type = entry.file_type().map_err(|e| StorageError::read(entry.path(), e))?;
        let is_file = if file_type.is_symlink() && follow_symlinks {
            fs::metadata(entry.path())
                .map(|m| m.is_file())
                .unwrap_or(false)
        } else {
            file_type.is_file()
        };
        if is_file {
            files.push(entry.file_name());
        }
    }
    files.sort();
    Ok(files)
}

/// Every file and directory below `root` (root itself excluded)
///
/// The checksum artifact named by `config.excluded_file_name` and any leftover
/// temp file of it are left out. Entries are sorted by
/// their relative name so the order does not depend on the platform.
pub fn subtree_entries(
    root: &Path,
    config: &WalkerConfig,
) -> Result<Vec<SubtreeEntry>, StorageError> {
    let mut entries = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .min_depth(1);

    for entry in walker {
        let entry = entry?;
        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            if checksum::is_artifact_file(entry.file_name(), &config.excluded_file_name) {
                continue;
            }
            EntryKind::File
        } else {
            // Symlinks that are not followed, sockets, devices
            continue;
        };

        let relative = path::relative_entry_name(root, entry.path())?;
        entries.push(SubtreeEntry {
            path: entry.path().to_path_buf(),
            relative,
            kind,
        });
    }

    entries.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(entries)
}
