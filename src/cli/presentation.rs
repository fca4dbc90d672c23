//! Presentation: pass reports and partition plans as text tables or JSON.

use crate::cli::parse::OutputFormat;
use crate::engine::{Action, Decision, DirectoryFailure, PassReport, PlannedDirectory};
use crate::error::BackupError;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::Path;

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, BackupError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn display_path(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

fn action_label(action: Action, color: bool) -> String {
    let label = match action {
        Action::Skipped => "skipped",
        Action::Empty => "empty",
        Action::Unchanged => "unchanged",
        Action::Archived => "archived",
        Action::WouldArchive => "would archive",
        Action::Failed => "FAILED",
    };
    if !color {
        return label.to_string();
    }
    match action {
        Action::Archived | Action::WouldArchive => label.green().to_string(),
        Action::Failed => label.red().bold().to_string(),
        Action::Unchanged => label.to_string(),
        Action::Skipped | Action::Empty => label.dimmed().to_string(),
    }
}

fn format_failures(failures: &[DirectoryFailure], root: &Path) -> String {
    let mut s = format!("\n\nFailures ({}):", failures.len());
    for failure in failures {
        s.push_str(&format!(
            "\n  - {}: {}",
            display_path(&failure.path, root),
            failure.error
        ));
    }
    s
}

/// Render a pass report
pub fn format_pass_report(
    report: &PassReport,
    format: OutputFormat,
    color: bool,
) -> Result<String, BackupError> {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Directory", "Depth", "Decision", "Action", "Archive"]);
    for outcome in &report.outcomes {
        if outcome.action == Action::Skipped {
            continue;
        }
        let archive = outcome
            .archive
            .as_deref()
            .map(|a| display_path(a, &report.destination_root))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            display_path(&outcome.path, &report.source_root),
            outcome.depth.to_string(),
            outcome.decision.to_string(),
            action_label(outcome.action, color),
            archive,
        ]);
    }

    let title = if report.dry_run { "Dry run" } else { "Archive pass" };
    let mut s = format!(
        "{}: {} -> {} (depth {})\n{}\n  Archived: {}  Would archive: {}  Unchanged: {}  Empty: {}  Skipped: {}  Failed: {}  ({} ms)",
        title,
        report.source_root.display(),
        report.destination_root.display(),
        report.archive_depth,
        table,
        report.archives_written(),
        report.count(Action::WouldArchive),
        report.count(Action::Unchanged),
        report.count(Action::Empty),
        report.count(Action::Skipped),
        report.failures.len(),
        report.duration_ms,
    );
    if !report.success() {
        s.push_str(&format_failures(&report.failures, &report.source_root));
    }
    Ok(s)
}

/// Render a depth partition plan
pub fn format_plan(
    root: &Path,
    archive_depth: usize,
    planned: &[PlannedDirectory],
    failures: &[DirectoryFailure],
    format: OutputFormat,
) -> Result<String, BackupError> {
    if format == OutputFormat::Json {
        let out = serde_json::json!({
            "source_root": root,
            "archive_depth": archive_depth,
            "directories": planned,
            "failures": failures,
        });
        return to_json(&out);
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Directory", "Depth", "Files", "Decision"]);
    for dir in planned {
        let decision = match dir.decision {
            Decision::Skip => "skip (covered by ancestor)",
            Decision::BundleLeaf => "bundle own files",
            Decision::EmptyLeaf => "empty, nothing to bundle",
            Decision::SubtreeRoot => "archive subtree",
        };
        table.add_row(vec![
            display_path(&dir.path, root),
            dir.depth.to_string(),
            dir.files.to_string(),
            decision.to_string(),
        ]);
    }

    let mut s = format!("Partition of {} at depth {}\n{}", root.display(), archive_depth, table);
    if !failures.is_empty() {
        s.push_str(&format_failures(failures, root));
    }
    Ok(s)
}
