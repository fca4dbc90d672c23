//! Archive codec seam
//!
//! The engine hands a codec a destination, a password, a filter configuration
//! and an ordered list of entries. Codecs only need to produce one file at the
//! path they are given; [`create_archive_atomic`] puts that file in place.

pub mod sevenz;

use crate::error::{CodecError, StorageError};
use crate::tree::path;
use crate::tree::walker::{self, EntryKind, WalkerConfig};
use crate::types::Password;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

pub use sevenz::SevenZCodec;

/// Where an archive entry's content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    /// Regular file read at archive time
    File(PathBuf),
    /// Directory marker (no content)
    Directory(PathBuf),
    /// In-memory content
    Bytes(Vec<u8>),
}

/// One entry of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Archive-relative name, `/`-separated
    pub name: String,
    pub source: EntrySource,
}

impl ArchiveEntry {
    pub fn file(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: EntrySource::File(path.into()),
        }
    }

    pub fn directory(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: EntrySource::Directory(path.into()),
        }
    }

    pub fn bytes(content: impl Into<Vec<u8>>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: EntrySource::Bytes(content.into()),
        }
    }
}

/// Compression and encryption parameters for one archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    /// LZMA2 preset, 0 (store-like) to 9
    pub preset: u32,
    /// AES-256 encryption with the caller's password
    pub encrypt: bool,
}

/// Picks a [`FilterConfig`] from the directory path
///
/// Paths with a component naming already-compressed media get the media
/// preset; everything else gets the default (maximum) preset. The whole path
/// counts, including the components above the source root.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    pub media_markers: Vec<String>,
    pub media_preset: u32,
    pub default_preset: u32,
    pub encrypt: bool,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            media_markers: ["Bilder", "Pictures", "Photos", "Videos", "Music"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            media_preset: 0,
            default_preset: 7,
            encrypt: true,
        }
    }
}

impl FilterPolicy {
    /// Filter for the directory at `dir`
    pub fn select(&self, dir: &Path) -> FilterConfig {
        let is_media = dir.components().any(|component| match component {
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                self.media_markers
                    .iter()
                    .any(|marker| name.eq_ignore_ascii_case(marker))
            }
            _ => false,
        });

        FilterConfig {
            preset: if is_media {
                self.media_preset
            } else {
                self.default_preset
            },
            encrypt: self.encrypt,
        }
    }
}

/// Produces one archive file from a list of entries
///
/// Calls block until the file is complete. Implementations may parallelize
/// internally.
pub trait ArchiveCodec {
    /// File extension of produced archives, without the dot
    fn extension(&self) -> &str;

    fn create_archive(
        &self,
        destination: &Path,
        password: &Password,
        filter: &FilterConfig,
        entries: &[ArchiveEntry],
    ) -> Result<(), CodecError>;
}

/// Entries for a directory's own files, named by file name
pub fn file_entries(dir: &Path, files: &[OsString]) -> Vec<ArchiveEntry> {
    files
        .iter()
        .map(|name| ArchiveEntry::file(dir.join(name), name.to_string_lossy()))
        .collect()
}

/// Entries for a whole subtree, rooted at the directory's own name
///
/// The root directory itself is the first entry so empty trees still unpack
/// to a directory. Checksum artifacts are filtered out.
pub fn subtree_entries(dir: &Path, config: &WalkerConfig) -> Result<Vec<ArchiveEntry>, StorageError> {
    let root_name = path::directory_name(dir)?;
    let mut entries = vec![ArchiveEntry::directory(dir, root_name.clone())];
    for entry in walker::subtree_entries(dir, config)? {
        let name = format!("{}/{}", root_name, entry.relative);
        entries.push(match entry.kind {
            EntryKind::Directory => ArchiveEntry::directory(entry.path, name),
            EntryKind::File => ArchiveEntry::file(entry.path, name),
        });
    }
    Ok(entries)
}

/// Run a codec against a partial file and rename it into place on success
///
/// On failure the partial file is removed and any previous archive at
/// `destination` is left as it was.
pub fn create_archive_atomic(
    codec: &dyn ArchiveCodec,
    destination: &Path,
    password: &Password,
    filter: &FilterConfig,
    entries: &[ArchiveEntry],
) -> Result<(), CodecError> {
    let partial = partial_path(destination)?;
    debug!(
        archive = %destination.display(),
        entries = entries.len(),
        preset = filter.preset,
        "Writing archive"
    );

    if let Err(e) = codec.create_archive(&partial, password, filter, entries) {
        if partial.exists() {
            if let Err(cleanup) = fs::remove_file(&partial) {
                warn!(path = %partial.display(), error = %cleanup, "Failed to remove partial archive");
            }
        }
        return Err(e);
    }

    fs::rename(&partial, destination).map_err(|e| {
        let _ = fs::remove_file(&partial);
        CodecError::Archive {
            path: destination.to_path_buf(),
            message: format!("failed to move archive into place: {}", e),
        }
    })
}

fn partial_path(destination: &Path) -> Result<PathBuf, CodecError> {
    let name = destination
        .file_name()
        .ok_or_else(|| CodecError::Archive {
            path: destination.to_path_buf(),
            message: "archive path has no file name".to_string(),
        })?
        .to_string_lossy();
    Ok(destination.with_file_name(format!(".{}.partial", name)))
}
