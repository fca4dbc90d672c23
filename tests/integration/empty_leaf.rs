//! Directories without data files never produce archives or checksums

use super::support::{Fixture, RecordingCodec};
use dirvault::engine::{Action, Decision};
use std::fs;

#[test]
fn test_directory_with_only_subdirectories_is_empty_leaf() {
    let fx = Fixture::new();
    fx.write("a/b/file.txt", "f");
    let codec = RecordingCodec::new();
    let report = fx.run(3, &codec);

    let a = report.outcome_for(&fx.src("a")).unwrap();
    assert_eq!(a.decision, Decision::EmptyLeaf);
    assert_eq!(a.action, Action::Empty);
    assert!(fx.checksum("a").is_none());
    assert!(!fx.dst("a").join("a.7z").exists());
}

#[test]
fn test_stale_checksum_alone_does_not_make_a_leaf() {
    let fx = Fixture::new();
    fx.write("a/file.txt", "f");
    let codec = RecordingCodec::new();
    fx.run(2, &codec);
    assert!(fx.checksum("a").is_some());

    fs::remove_file(fx.src("a/file.txt")).unwrap();
    codec.reset();
    let report = fx.run(2, &codec);

    let a = report.outcome_for(&fx.src("a")).unwrap();
    assert_eq!(a.decision, Decision::EmptyLeaf);
    assert_eq!(codec.call_count(), 0);
    // The previous archive is left in place
    assert!(fx.dst("a").join("a.7z").exists());
}

#[test]
fn test_subtree_without_files_is_not_archived() {
    let fx = Fixture::new();
    fx.mkdir("a/b/c");
    let codec = RecordingCodec::new();
    let report = fx.run(1, &codec);

    let a = report.outcome_for(&fx.src("a")).unwrap();
    assert_eq!(a.decision, Decision::SubtreeRoot);
    assert_eq!(a.action, Action::Empty);
    assert_eq!(codec.call_count(), 0);
    assert!(!fx.dst("a.7z").exists());
    assert!(fx.checksum("a").is_none());
}

#[test]
fn test_empty_source_root() {
    let fx = Fixture::new();
    let codec = RecordingCodec::new();
    let report = fx.run(2, &codec);

    assert!(report.success());
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].action, Action::Empty);
    assert!(!fx.destination.exists());
}
