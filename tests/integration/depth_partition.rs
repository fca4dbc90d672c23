//! Every data file is covered by exactly one archive at any depth

use super::support::{Fixture, RecordingCodec};
use dirvault::engine::{plan_partition, Decision};
use std::collections::HashMap;
use std::path::PathBuf;
use walkdir::WalkDir;

fn tree() -> Fixture {
    let fx = Fixture::new();
    fx.write("root.txt", "r");
    fx.write("a/a.txt", "a");
    fx.write("a/b/b.txt", "b");
    fx.write("a/b/c/c.txt", "c");
    fx.write("a/b/c/d/d.txt", "d");
    fx.write("e/e.txt", "e");
    fx.write("e/f/g/g.txt", "g");
    fx.mkdir("h/i");
    fx
}

fn data_files(fx: &Fixture) -> Vec<PathBuf> {
    WalkDir::new(&fx.source)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file() && e.file_name() != "checksum.txt")
        .map(|e| e.into_path())
        .collect()
}

#[test]
fn test_each_file_archived_exactly_once() {
    for depth in 0..6 {
        let fx = tree();
        let codec = RecordingCodec::new();
        let report = fx.run(depth, &codec);
        assert!(report.success(), "depth {}", depth);

        let mut coverage: HashMap<PathBuf, usize> = HashMap::new();
        for call in codec.calls.borrow().iter() {
            for source in &call.sources {
                *coverage.entry(source.clone()).or_default() += 1;
            }
        }

        let files = data_files(&fx);
        for file in &files {
            assert_eq!(
                coverage.get(file).copied(),
                Some(1),
                "depth {}: {} covered {:?} times",
                depth,
                file.display(),
                coverage.get(file)
            );
        }
        assert_eq!(coverage.len(), files.len(), "depth {}", depth);
    }
}

#[test]
fn test_depth_zero_archives_root_as_one_subtree() {
    let fx = tree();
    let codec = RecordingCodec::new();
    let report = fx.run(0, &codec);

    assert_eq!(codec.call_count(), 1);
    let root = report.outcome_for(&fx.src("")).unwrap();
    assert_eq!(root.decision, Decision::SubtreeRoot);
    assert_eq!(root.archive.as_deref(), Some(fx.destination.with_extension("7z").as_path()));
    // Children of the root are visited only to be pruned
    assert!(report.outcome_for(&fx.src("a/b")).is_none());
}

#[test]
fn test_deep_depth_bundles_every_directory() {
    let fx = tree();
    let codec = RecordingCodec::new();
    let report = fx.run(10, &codec);

    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o.decision, Decision::BundleLeaf | Decision::EmptyLeaf)));
    assert_eq!(codec.call_count(), 7);
}

#[test]
fn test_plan_matches_pass_decisions() {
    let fx = tree();
    let (planned, failures) = plan_partition(&fx.source, 2, &fx.settings(2).walker_config());
    assert!(failures.is_empty());

    let codec = RecordingCodec::new();
    let report = fx.run(2, &codec);
    assert_eq!(planned.len(), report.outcomes.len());
    for dir in &planned {
        let outcome = report.outcome_for(&dir.path).unwrap();
        assert_eq!(outcome.decision, dir.decision, "{}", dir.path.display());
    }
}
