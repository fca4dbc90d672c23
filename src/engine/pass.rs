//! One archival pass over a source tree
//!
//! Directories are visited top-down in file-name order. Each one is classified
//! by depth ([`Decision`]) and handled by exactly one branch:
//!
//! - skip: nothing, and the walk does not descend further
//! - empty leaf: nothing
//! - bundle leaf: archive the direct files into `<mirror>/<name>.<ext>`
//! - subtree root: archive everything below into `<mirror>.<ext>`
//!
//! Write order in both archiving branches: archive to a partial file, rename
//! into place, then persist the checksum artifact. An interruption anywhere
//! before the artifact write leaves the old artifact (or none), so the next
//! pass redoes the work.
//!
//! Only one pass may run against a given source/destination pair at a time.
//! This is not enforced.

use crate::checksum;
use crate::codec::{self, ArchiveCodec, ArchiveEntry};
use crate::config::RunSettings;
use crate::engine::policy::Decision;
use crate::engine::report::{Action, DirectoryFailure, DirectoryOutcome, PassReport};
use crate::error::{BackupError, StorageError};
use crate::tree::hasher;
use crate::tree::path;
use crate::tree::walker::{TraversalNode, WalkFailure, Walker, WalkerConfig};
use crate::types::{Fingerprint, Password};
use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, info_span, instrument, warn};

/// Drives a pass: walk, classify, fingerprint, archive
pub struct ArchivePass<'a> {
    settings: RunSettings,
    codec: &'a dyn ArchiveCodec,
    password: Password,
    walker_config: WalkerConfig,
}

/// Mutable state of a single run
#[derive(Default)]
struct RunState {
    outcomes: Vec<DirectoryOutcome>,
    failures: Vec<DirectoryFailure>,
    /// Archive path -> directory that owns it in this pass
    claimed: HashMap<PathBuf, PathBuf>,
}

impl<'a> ArchivePass<'a> {
    pub fn new(settings: RunSettings, codec: &'a dyn ArchiveCodec, password: Password) -> Self {
        let walker_config = settings.walker_config();
        Self {
            settings,
            codec,
            password,
            walker_config,
        }
    }

    /// Run one pass. Per-directory errors are recorded in the report, never
    /// propagated.
    #[instrument(
        skip(self),
        fields(
            source = %self.settings.source_root.display(),
            destination = %self.settings.destination_root.display(),
            archive_depth = self.settings.archive_depth,
            dry_run = self.settings.dry_run
        )
    )]
    pub fn run(&self) -> PassReport {
        let started_at = Utc::now();
        let start = Instant::now();
        info!("Starting archive pass");

        let mut state = RunState::default();
        let walker =
            Walker::with_config(self.settings.source_root.clone(), self.walker_config.clone());
        let mut walk = walker.directories();

        while let Some(item) = walk.next() {
            let node = match item {
                Ok(node) => node,
                Err(failure) => {
                    self.record_walk_failure(&mut state, failure);
                    continue;
                }
            };

            let has_data_files = node.data_file_count(&self.settings.checksum_file_name) > 0;
            let decision =
                Decision::classify(node.depth, self.settings.archive_depth, has_data_files);

            if decision == Decision::Skip {
                walk.prune();
            }

            let span = info_span!("directory", path = %node.path.display(), depth = node.depth, %decision);
            let _guard = span.enter();

            match self.process(&node, decision, &mut state) {
                Ok(outcome) => state.outcomes.push(outcome),
                Err(e) => {
                    error!(error = %e, "Directory processing failed, checksum left untouched");
                    state.outcomes.push(DirectoryOutcome {
                        path: node.path.clone(),
                        depth: node.depth,
                        decision,
                        action: Action::Failed,
                        fingerprint: None,
                        archive: None,
                    });
                    state.failures.push(DirectoryFailure {
                        path: node.path,
                        decision: Some(decision),
                        error: e.to_string(),
                    });
                }
            }
        }

        let report = PassReport {
            source_root: self.settings.source_root.clone(),
            destination_root: self.settings.destination_root.clone(),
            archive_depth: self.settings.archive_depth,
            dry_run: self.settings.dry_run,
            started_at,
            duration_ms: start.elapsed().as_millis(),
            outcomes: state.outcomes,
            failures: state.failures,
        };

        if report.success() {
            info!(
                directories = report.outcomes.len(),
                archived = report.archives_written(),
                unchanged = report.count(Action::Unchanged),
                duration_ms = report.duration_ms,
                "Archive pass complete"
            );
        } else {
            warn!(
                directories = report.outcomes.len(),
                archived = report.archives_written(),
                failed = report.failures.len(),
                duration_ms = report.duration_ms,
                "Archive pass complete with failures"
            );
        }
        report
    }

    fn record_walk_failure(&self, state: &mut RunState, failure: WalkFailure) {
        // walkdir reports an unreadable directory again when descending into it
        if state.failures.last().map(|f| &f.path) == Some(&failure.path) {
            return;
        }
        error!(path = %failure.path.display(), error = %failure.error, "Failed to read directory");
        state.failures.push(DirectoryFailure {
            path: failure.path,
            decision: None,
            error: failure.error.to_string(),
        });
    }

    fn process(
        &self,
        node: &TraversalNode,
        decision: Decision,
        state: &mut RunState,
    ) -> Result<DirectoryOutcome, BackupError> {
        let outcome = |action: Action, fingerprint: Option<&Fingerprint>, archive: Option<PathBuf>| {
            DirectoryOutcome {
                path: node.path.clone(),
                depth: node.depth,
                decision,
                action,
                fingerprint: fingerprint.map(|f| f.to_string()),
                archive,
            }
        };

        match decision {
            Decision::Skip => {
                debug!("Skipping directory, covered by an ancestor's subtree archive");
                Ok(outcome(Action::Skipped, None, None))
            }
            Decision::EmptyLeaf => {
                info!("Empty directory, no files to bundle");
                Ok(outcome(Action::Empty, None, None))
            }
            Decision::BundleLeaf => self.bundle_leaf(node, state, outcome),
            Decision::SubtreeRoot => self.archive_subtree(node, state, outcome),
        }
    }

    /// Archive a directory's direct files when they changed
    fn bundle_leaf<F>(
        &self,
        node: &TraversalNode,
        state: &mut RunState,
        outcome: F,
    ) -> Result<DirectoryOutcome, BackupError>
    where
        F: Fn(Action, Option<&Fingerprint>, Option<PathBuf>) -> DirectoryOutcome,
    {
        let check =
            hasher::fingerprint_files(&node.path, &node.files, &self.settings.checksum_file_name)?;

        let mirror = self.mirror(&node.path)?;
        let archive = mirror.join(format!(
            "{}.{}",
            self.archive_stem(&node.path)?,
            self.codec.extension()
        ));
        self.claim(state, &archive, &node.path)?;

        if check.unchanged {
            info!(fingerprint = %check.fingerprint, "Files unchanged");
            return Ok(outcome(Action::Unchanged, Some(&check.fingerprint), Some(archive)));
        }
        if self.settings.dry_run {
            info!(archive = %archive.display(), "Files changed, would bundle");
            return Ok(outcome(Action::WouldArchive, Some(&check.fingerprint), Some(archive)));
        }

        info!(archive = %archive.display(), files = check.data_files.len(), "Files changed, bundling");
        create_dir(&mirror)?;

        let mut entries = codec::file_entries(&node.path, &check.data_files);
        entries.push(ArchiveEntry::bytes(
            check.fingerprint.as_str().as_bytes().to_vec(),
            self.settings.checksum_file_name.clone(),
        ));
        let filter = self.settings.filter_policy.select(&node.path);
        codec::create_archive_atomic(self.codec, &archive, &self.password, &filter, &entries)?;

        checksum::write_artifact(&check.artifact_path, &check.fingerprint)?;
        Ok(outcome(Action::Archived, Some(&check.fingerprint), Some(archive)))
    }

    /// Archive a whole subtree when anything below it changed
    fn archive_subtree<F>(
        &self,
        node: &TraversalNode,
        state: &mut RunState,
        outcome: F,
    ) -> Result<DirectoryOutcome, BackupError>
    where
        F: Fn(Action, Option<&Fingerprint>, Option<PathBuf>) -> DirectoryOutcome,
    {
        let fingerprint = hasher::fingerprint_subtree(&node.path, &self.walker_config)?;
        if fingerprint.is_empty_sentinel() {
            info!("Subtree holds no files, nothing to archive");
            return Ok(outcome(Action::Empty, None, None));
        }

        let archive =
            path::with_archive_extension(&self.mirror(&node.path)?, self.codec.extension());
        self.claim(state, &archive, &node.path)?;

        let artifact_path = node.path.join(&self.settings.checksum_file_name);
        if checksum::read_artifact(&artifact_path)?.as_ref() == Some(&fingerprint) {
            info!(%fingerprint, "Subtree unchanged");
            return Ok(outcome(Action::Unchanged, Some(&fingerprint), Some(archive)));
        }
        if self.settings.dry_run {
            info!(archive = %archive.display(), "Subtree changed, would archive");
            return Ok(outcome(Action::WouldArchive, Some(&fingerprint), Some(archive)));
        }

        info!(archive = %archive.display(), "Subtree changed, archiving");
        if let Some(parent) = archive.parent() {
            create_dir(parent)?;
        }

        let entries = codec::subtree_entries(&node.path, &self.walker_config)?;
        let filter = self.settings.filter_policy.select(&node.path);
        codec::create_archive_atomic(self.codec, &archive, &self.password, &filter, &entries)?;

        checksum::write_artifact(&artifact_path, &fingerprint)?;
        Ok(outcome(Action::Archived, Some(&fingerprint), Some(archive)))
    }

    fn mirror(&self, dir: &Path) -> Result<PathBuf, StorageError> {
        path::mirror_path(
            &self.settings.source_root,
            &self.settings.destination_root,
            dir,
        )
    }

    fn archive_stem(&self, dir: &Path) -> Result<String, StorageError> {
        path::directory_name(dir)
    }

    /// Two directories must never share an archive path within a pass.
    ///
    /// This happens when a subtree root has the same name as its parent and
    /// the parent bundles its own files.
    fn claim(&self, state: &mut RunState, archive: &Path, dir: &Path) -> Result<(), StorageError> {
        if let Some(owner) = state.claimed.get(archive) {
            return Err(StorageError::InvalidPath(format!(
                "archive {} is already produced for {}",
                archive.display(),
                owner.display()
            )));
        }
        state.claimed.insert(archive.to_path_buf(), dir.to_path_buf());
        Ok(())
    }
}

fn create_dir(dir: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|source| StorageError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
