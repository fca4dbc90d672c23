//! Path canonicalization, archive entry naming and destination mirroring

use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a root path (resolves symlinks, `..`, `.`)
///
/// Uses dunce so Windows paths stay free of the `\\?\` prefix.
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, StorageError> {
    dunce::canonicalize(path).map_err(|e| {
        StorageError::InvalidPath(format!(
            "Failed to canonicalize {}: {}",
            path.display(),
            e
        ))
    })
}

/// Archive-relative name of `path` below `base`
///
/// Components are joined with `/` and NFC-normalized so the same tree yields the
/// same names on every platform.
pub fn relative_entry_name(base: &Path, path: &Path) -> Result<String, StorageError> {
    let relative = path.strip_prefix(base).map_err(|_| {
        StorageError::InvalidPath(format!(
            "{} is not below {}",
            path.display(),
            base.display()
        ))
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy().nfc().collect::<String>()),
            Component::CurDir => {}
            other => {
                return Err(StorageError::InvalidPath(format!(
                    "Unexpected component {:?} in {}",
                    other,
                    path.display()
                )))
            }
        }
    }
    Ok(parts.join("/"))
}

/// Final path component of a directory, used to name its archive
pub fn directory_name(dir: &Path) -> Result<String, StorageError> {
    dir.file_name()
        .map(|name| name.to_string_lossy().nfc().collect())
        .ok_or_else(|| StorageError::InvalidPath(format!("{} has no name", dir.display())))
}

/// Location under `destination_root` mirroring `dir` under `source_root`
pub fn mirror_path(
    source_root: &Path,
    destination_root: &Path,
    dir: &Path,
) -> Result<PathBuf, StorageError> {
    let relative = dir.strip_prefix(source_root).map_err(|_| {
        StorageError::InvalidPath(format!(
            "{} is not below source root {}",
            dir.display(),
            source_root.display()
        ))
    })?;
    Ok(destination_root.join(relative))
}

/// Append an archive extension to a path without replacing any existing one
pub fn with_archive_extension(path: &Path, extension: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".");
    raw.push(extension);
    PathBuf::from(raw)
}

/// True when `child` equals `parent` or lies below it (both canonical)
pub fn is_within(parent: &Path, child: &Path) -> bool {
    child.starts_with(parent)
}
