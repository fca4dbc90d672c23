//! Shared fixtures: codec doubles, tree builders and settings helpers

use dirvault::codec::{ArchiveCodec, ArchiveEntry, EntrySource, FilterConfig, FilterPolicy};
use dirvault::config::RunSettings;
use dirvault::engine::{ArchivePass, PassReport};
use dirvault::error::CodecError;
use dirvault::types::Password;
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CHECKSUM: &str = "checksum.txt";

/// One codec invocation
#[derive(Debug, Clone)]
pub struct RecordedArchive {
    /// Final archive path (partial suffix stripped)
    pub destination: PathBuf,
    pub filter: FilterConfig,
    pub entry_names: Vec<String>,
    /// Source paths of file entries
    pub sources: Vec<PathBuf>,
    /// Content of in-memory entries, by name
    pub inline: Vec<(String, Vec<u8>)>,
}

/// Writes entry names into the archive file and records every call
///
/// Set `fail_matching` to make calls whose destination contains the given
/// text fail after writing a partial file.
#[derive(Default)]
pub struct RecordingCodec {
    pub calls: RefCell<Vec<RecordedArchive>>,
    pub fail_matching: RefCell<Option<String>>,
    pub failures: Cell<usize>,
}

impl RecordingCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pattern: &str) -> Self {
        let codec = Self::default();
        *codec.fail_matching.borrow_mut() = Some(pattern.to_string());
        codec
    }

    pub fn stop_failing(&self) {
        *self.fail_matching.borrow_mut() = None;
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn reset(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn archive_for(&self, destination: &Path) -> Option<RecordedArchive> {
        self.calls
            .borrow()
            .iter()
            .find(|c| c.destination == destination)
            .cloned()
    }
}

fn final_destination(partial: &Path) -> PathBuf {
    let name = partial.file_name().unwrap().to_string_lossy().to_string();
    let name = name
        .strip_prefix('.')
        .and_then(|n| n.strip_suffix(".partial"))
        .map(str::to_string)
        .unwrap_or(name);
    partial.with_file_name(name)
}

impl ArchiveCodec for RecordingCodec {
    fn extension(&self) -> &str {
        "7z"
    }

    fn create_archive(
        &self,
        destination: &Path,
        _password: &Password,
        filter: &FilterConfig,
        entries: &[ArchiveEntry],
    ) -> Result<(), CodecError> {
        let names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        fs::write(destination, names.join("\n"))?;

        let target = final_destination(destination);
        if let Some(pattern) = self.fail_matching.borrow().as_deref() {
            if target.to_string_lossy().contains(pattern) {
                self.failures.set(self.failures.get() + 1);
                return Err(CodecError::Archive {
                    path: target,
                    message: "simulated codec failure".to_string(),
                });
            }
        }

        let sources = entries
            .iter()
            .filter_map(|e| match &e.source {
                EntrySource::File(path) => Some(path.clone()),
                _ => None,
            })
            .collect();
        let inline = entries
            .iter()
            .filter_map(|e| match &e.source {
                EntrySource::Bytes(bytes) => Some((e.name.clone(), bytes.clone())),
                _ => None,
            })
            .collect();
        self.calls.borrow_mut().push(RecordedArchive {
            destination: target,
            filter: *filter,
            entry_names: names,
            sources,
            inline,
        });
        Ok(())
    }
}

/// Source and destination roots inside one temp dir
pub struct Fixture {
    _temp: TempDir,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        Self::named("source")
    }

    /// Source root with the given directory name
    pub fn named(source_name: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let source = dunce::canonicalize(temp.path()).unwrap().join(source_name);
        let destination = dunce::canonicalize(temp.path()).unwrap().join("destination");
        fs::create_dir_all(&source).unwrap();
        Self {
            _temp: temp,
            source,
            destination,
        }
    }

    /// Write a file below the source root, creating parents
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.source.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.source.join(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn src(&self, relative: &str) -> PathBuf {
        if relative.is_empty() {
            self.source.clone()
        } else {
            self.source.join(relative)
        }
    }

    pub fn dst(&self, relative: &str) -> PathBuf {
        self.destination.join(relative)
    }

    pub fn settings(&self, depth: usize) -> RunSettings {
        RunSettings {
            source_root: self.source.clone(),
            destination_root: self.destination.clone(),
            archive_depth: depth,
            checksum_file_name: CHECKSUM.to_string(),
            follow_symlinks: false,
            filter_policy: FilterPolicy::default(),
            dry_run: false,
        }
    }

    pub fn run(&self, depth: usize, codec: &RecordingCodec) -> PassReport {
        ArchivePass::new(self.settings(depth), codec, Password::new("test")).run()
    }

    pub fn checksum(&self, relative: &str) -> Option<String> {
        fs::read_to_string(self.src(relative).join(CHECKSUM)).ok()
    }
}
