//! A failed archive never leaves a checksum claiming it succeeded

use super::support::{Fixture, RecordingCodec};
use dirvault::engine::Action;
use std::fs;

fn tree() -> Fixture {
    let fx = Fixture::new();
    fx.write("A/a.txt", "a");
    fx.write("D/d.txt", "d");
    fx.write("S/T/t.txt", "t");
    fx
}

#[test]
fn test_codec_failure_is_isolated_to_one_directory() {
    let fx = tree();
    let codec = RecordingCodec::failing_on("D.7z");
    let report = fx.run(2, &codec);

    assert!(!report.success());
    assert_eq!(report.failed_paths(), vec![&fx.src("D")]);
    assert_eq!(report.outcome_for(&fx.src("D")).unwrap().action, Action::Failed);
    assert_eq!(report.outcome_for(&fx.src("A")).unwrap().action, Action::Archived);
    assert_eq!(report.outcome_for(&fx.src("S")).unwrap().action, Action::Empty);
    assert_eq!(report.outcome_for(&fx.src("S/T")).unwrap().action, Action::Archived);

    assert!(fx.checksum("D").is_none());
    assert!(!fx.dst("D").join("D.7z").exists());
    assert!(!fx.dst("D").join(".D.7z.partial").exists());
}

#[test]
fn test_failed_directory_is_retried_next_pass() {
    let fx = tree();
    let codec = RecordingCodec::failing_on("D.7z");
    fx.run(2, &codec);
    assert_eq!(codec.failures.get(), 1);

    codec.stop_failing();
    codec.reset();
    let report = fx.run(2, &codec);

    assert!(report.success());
    assert_eq!(codec.call_count(), 1);
    assert!(codec.archive_for(&fx.dst("D").join("D.7z")).is_some());
    assert!(fx.checksum("D").is_some());
}

#[test]
fn test_failed_rearchive_keeps_previous_archive_and_checksum() {
    let fx = tree();
    let codec = RecordingCodec::new();
    fx.run(2, &codec);
    let old_checksum = fx.checksum("S/T").unwrap();
    let archive = fx.dst("S/T.7z");
    let old_archive = fs::read(&archive).unwrap();

    fx.write("S/T/t.txt", "t, edited");
    *codec.fail_matching.borrow_mut() = Some("T.7z".to_string());
    let report = fx.run(2, &codec);

    assert_eq!(report.failed_paths(), vec![&fx.src("S/T")]);
    assert_eq!(fx.checksum("S/T").unwrap(), old_checksum);
    assert_eq!(fs::read(&archive).unwrap(), old_archive);
}

#[test]
fn test_interrupted_before_checksum_write_redoes_work() {
    let fx = tree();
    let codec = RecordingCodec::new();
    fx.run(2, &codec);
    let old_checksum = fx.checksum("A").unwrap();

    // The new archive lands, then the process dies before the checksum is written
    fx.write("A/a.txt", "a, edited");
    fx.run(2, &codec);
    fs::write(fx.src("A/checksum.txt"), &old_checksum).unwrap();

    codec.reset();
    let report = fx.run(2, &codec);
    assert_eq!(report.outcome_for(&fx.src("A")).unwrap().action, Action::Archived);
    assert_eq!(codec.call_count(), 1);
    assert_ne!(fx.checksum("A").unwrap(), old_checksum);

    codec.reset();
    let settled = fx.run(2, &codec);
    assert!(settled.success());
    assert_eq!(codec.call_count(), 0);
}

#[test]
fn test_subtree_without_checksum_after_crash_is_rearchived_once() {
    let fx = tree();
    let codec = RecordingCodec::new();
    fx.run(2, &codec);

    fx.write("S/T/t.txt", "t, edited");
    fx.run(2, &codec);
    // Crash before the first checksum of this state was ever written
    fs::remove_file(fx.src("S/T/checksum.txt")).unwrap();

    codec.reset();
    let report = fx.run(2, &codec);
    assert_eq!(report.outcome_for(&fx.src("S/T")).unwrap().action, Action::Archived);
    assert!(codec.archive_for(&fx.dst("S/T.7z")).is_some());

    codec.reset();
    fx.run(2, &codec);
    assert_eq!(codec.call_count(), 0);
}

#[test]
fn test_leftover_checksum_temp_file_is_not_data() {
    let fx = tree();
    let codec = RecordingCodec::new();
    fx.run(2, &codec);

    // An artifact write interrupted between create and rename
    fs::write(fx.src("A/.checksum.txt.tmp"), "half").unwrap();
    fs::write(fx.src("S/T/.checksum.txt.tmp"), "half").unwrap();

    codec.reset();
    let report = fx.run(2, &codec);
    assert!(report.success());
    assert_eq!(codec.call_count(), 0);

    // A real change re-archives without picking the leftover up
    fx.write("S/T/t.txt", "t, edited");
    fx.run(2, &codec);
    let recorded = codec.archive_for(&fx.dst("S/T.7z")).unwrap();
    assert_eq!(recorded.entry_names, vec!["T", "T/t.txt"]);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_reported_and_pass_continues() {
    use std::os::unix::fs::PermissionsExt;

    let fx = tree();
    let locked = fx.src("D");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    // Running as root ignores permission bits
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let codec = RecordingCodec::new();
    let report = fx.run(2, &codec);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(!report.success());
    assert!(report.failed_paths().contains(&&locked));
    assert!(fx.dst("A").join("A.7z").exists());
    assert!(fx.dst("S/T.7z").exists());
}
