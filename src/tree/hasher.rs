//! Fingerprint computation for directories using BLAKE3
//!
//! Fingerprint format v1:
//!
//! ```text
//! files   = BLAKE3("dirvault-files-v1"   || for each file:  len(name) || name || digest(file))
//! subtree = BLAKE3("dirvault-subtree-v1" || for each file:  len(rel)  || rel  || digest(file))
//! ```
//!
//! `len` is a big-endian u64, `digest` the raw 32-byte BLAKE3 of the content.
//! Files are folded in sorted order (file name for a file set, `/`-separated
//! relative path for a subtree). Checksum artifacts never contribute.

use crate::checksum;
use crate::error::StorageError;
use crate::tree::walker::{self, EntryKind, WalkerConfig};
use crate::types::{Digest, Fingerprint};
use blake3::Hasher;
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

const FILES_DOMAIN: &[u8] = b"dirvault-files-v1";
const SUBTREE_DOMAIN: &[u8] = b"dirvault-subtree-v1";

/// Stream a file through BLAKE3
pub fn digest_file(path: &Path) -> Result<Digest, StorageError> {
    let file = File::open(path).map_err(|e| StorageError::read(path, e))?;
    let mut hasher = Hasher::new();
    hasher
        .update_reader(file)
        .map_err(|e| StorageError::read(path, e))?;
    Ok(*hasher.finalize().as_bytes())
}

/// Folds named per-file digests into one fingerprint
struct Accumulator {
    hasher: Hasher,
    files: usize,
}

impl Accumulator {
    fn new(domain: &[u8]) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(domain);
        Self { hasher, files: 0 }
    }

    fn add(&mut self, name: &str, digest: &Digest) {
        let name = name.as_bytes();
        self.hasher.update(&(name.len() as u64).to_be_bytes());
        self.hasher.update(name);
        self.hasher.update(digest);
        self.files += 1;
    }

    /// `None` when nothing was folded in.
    fn finish(self) -> Option<Fingerprint> {
        if self.files == 0 {
            return None;
        }
        Some(Fingerprint::from_digest(self.hasher.finalize().as_bytes()))
    }
}

/// Result of fingerprinting a directory's direct files
#[derive(Debug, Clone)]
pub struct FileSetCheck {
    /// Fingerprint matches the stored artifact, or there is nothing to compare
    pub unchanged: bool,
    pub fingerprint: Fingerprint,
    pub artifact_path: PathBuf,
    /// Files that contributed, in fold order (artifact excluded)
    pub data_files: Vec<OsString>,
}

/// Fingerprint the named files of `dir` and compare with its checksum artifact
///
/// Files are folded in the order given; the walker hands them over sorted.
/// A file named `artifact_name` is skipped. With no data files the result is
/// unchanged with the empty sentinel, whatever the artifact says.
pub fn fingerprint_files(
    dir: &Path,
    files: &[OsString],
    artifact_name: &str,
) -> Result<FileSetCheck, StorageError> {
    let artifact_path = dir.join(artifact_name);
    let data_files: Vec<OsString> = files
        .iter()
        .filter(|name| !checksum::is_artifact_file(name, artifact_name))
        .cloned()
        .collect();

    let mut acc = Accumulator::new(FILES_DOMAIN);
    for name in &data_files {
        let digest = digest_file(&dir.join(name))?;
        trace!(file = ?name, digest = %hex::encode(digest), "Digested file");
        acc.add(&name.to_string_lossy(), &digest);
    }

    let Some(fingerprint) = acc.finish() else {
        return Ok(FileSetCheck {
            unchanged: true,
            fingerprint: Fingerprint::empty(),
            artifact_path,
            data_files,
        });
    };
    debug!(dir = %dir.display(), %fingerprint, "Computed file set fingerprint");

    let stored = checksum::read_artifact(&artifact_path)?;
    let unchanged = stored.as_ref() == Some(&fingerprint);
    Ok(FileSetCheck {
        unchanged,
        fingerprint,
        artifact_path,
        data_files,
    })
}

/// Fingerprint every file below `dir`, checksum artifacts excluded
///
/// Returns the empty sentinel when the subtree holds no data files. Does not
/// look at any stored artifact.
pub fn fingerprint_subtree(dir: &Path, config: &WalkerConfig) -> Result<Fingerprint, StorageError> {
    let mut acc = Accumulator::new(SUBTREE_DOMAIN);
    for entry in walker::subtree_entries(dir, config)? {
        if entry.kind != EntryKind::File {
            continue;
        }
        let digest = digest_file(&entry.path)?;
        acc.add(&entry.relative, &digest);
    }

    let fingerprint = acc.finish().unwrap_or_else(Fingerprint::empty);
    debug!(dir = %dir.display(), %fingerprint, "Computed subtree fingerprint");
    Ok(fingerprint)
}
