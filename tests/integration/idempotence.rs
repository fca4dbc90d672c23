//! A second pass over an untouched tree writes nothing

use super::support::{Fixture, RecordingCodec};
use dirvault::engine::Action;
use std::fs;

fn populated() -> Fixture {
    let fx = Fixture::new();
    fx.write("top.txt", "top");
    fx.write("A/a.txt", "a");
    fx.write("A/B/b.txt", "b");
    fx.write("A/B/C/c.txt", "c");
    fx.write("D/d.txt", "d");
    fx.mkdir("E/F");
    fx
}

#[test]
fn test_second_pass_invokes_no_codec() {
    let fx = populated();
    let codec = RecordingCodec::new();

    let first = fx.run(2, &codec);
    assert!(first.success());
    assert!(first.archives_written() > 0);

    codec.reset();
    let second = fx.run(2, &codec);
    assert!(second.success());
    assert_eq!(codec.call_count(), 0);
    assert_eq!(second.archives_written(), 0);
    assert_eq!(second.count(Action::Unchanged), first.archives_written());
}

#[test]
fn test_second_pass_leaves_checksums_and_archives_untouched() {
    let fx = populated();
    let codec = RecordingCodec::new();
    fx.run(2, &codec);

    let checksum_before = fx.checksum("A").unwrap();
    let archive = fx.dst("A").join("A.7z");
    let modified_before = fs::metadata(&archive).unwrap().modified().unwrap();

    fx.run(2, &codec);

    assert_eq!(fx.checksum("A").unwrap(), checksum_before);
    assert_eq!(fs::metadata(&archive).unwrap().modified().unwrap(), modified_before);
}

#[test]
fn test_idempotent_at_every_depth() {
    for depth in 0..5 {
        let fx = populated();
        let codec = RecordingCodec::new();
        fx.run(depth, &codec);
        codec.reset();

        let report = fx.run(depth, &codec);
        assert!(report.success(), "depth {}", depth);
        assert_eq!(codec.call_count(), 0, "depth {}", depth);
    }
}
