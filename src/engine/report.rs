//! Outcome of a pass: per-directory results and aggregate status

use crate::engine::policy::Decision;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// What happened to one directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Covered by an ancestor's subtree archive
    Skipped,
    /// No data files (leaf) or no files at all (subtree); nothing written
    Empty,
    /// Fingerprint matches the stored artifact
    Unchanged,
    /// Archive written and artifact updated
    Archived,
    /// Dry run: an archive would have been written
    WouldArchive,
    /// Processing failed; artifact untouched
    Failed,
}

/// Result for one visited directory
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryOutcome {
    pub path: PathBuf,
    pub depth: usize,
    pub decision: Decision,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,
}

/// A directory whose processing failed
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryFailure {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    pub error: String,
}

/// Aggregate result of one pass over a source tree
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub archive_depth: usize,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
    pub outcomes: Vec<DirectoryOutcome>,
    pub failures: Vec<DirectoryFailure>,
}

impl PassReport {
    /// True when no directory failed
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn count(&self, action: Action) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    pub fn archives_written(&self) -> usize {
        self.count(Action::Archived)
    }

    /// Outcome recorded for `path`, if it was visited
    pub fn outcome_for(&self, path: &std::path::Path) -> Option<&DirectoryOutcome> {
        self.outcomes.iter().find(|o| o.path == path)
    }

    pub fn failed_paths(&self) -> Vec<&PathBuf> {
        self.failures.iter().map(|f| &f.path).collect()
    }
}
