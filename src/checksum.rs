//! Checksum artifacts
//!
//! A checksum artifact is a plain-text file inside a source directory holding
//! exactly the hex fingerprint of the last successfully archived state of that
//! directory. It is written only after the archive it certifies is in place.

use crate::error::StorageError;
use crate::types::Fingerprint;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Read a stored fingerprint. A missing or blank artifact yields `None`.
pub fn read_artifact(path: &Path) -> Result<Option<Fingerprint>, StorageError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Fingerprint::parse_artifact(&content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::read(path, e)),
    }
}

/// Persist a fingerprint atomically (temp file, fsync, rename)
pub fn write_artifact(path: &Path, fingerprint: &Fingerprint) -> Result<(), StorageError> {
    let tmp_path = temp_path(path)?;

    let mut file = File::create(&tmp_path).map_err(|e| StorageError::write(&tmp_path, e))?;
    file.write_all(fingerprint.as_str().as_bytes())
        .map_err(|e| StorageError::write(&tmp_path, e))?;
    file.sync_all()
        .map_err(|e| StorageError::write(&tmp_path, e))?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StorageError::write(path, e)
    })
}

/// Name of the temp file an artifact write goes through
pub fn temp_file_name(artifact_name: &str) -> String {
    format!(".{artifact_name}.tmp")
}

/// True for the artifact itself and for a temp file an interrupted write left
///
/// Neither ever counts as data: both are excluded from fingerprints and
/// archives.
pub fn is_artifact_file(name: &OsStr, artifact_name: &str) -> bool {
    name == OsStr::new(artifact_name) || name == OsStr::new(&temp_file_name(artifact_name))
}

fn temp_path(path: &Path) -> Result<PathBuf, StorageError> {
    let dir = path
        .parent()
        .ok_or_else(|| StorageError::InvalidPath(format!("{} has no parent", path.display())))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "checksum".to_owned());
    Ok(dir.join(temp_file_name(&name)))
}
