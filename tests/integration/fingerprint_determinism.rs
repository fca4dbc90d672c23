//! Fingerprints depend on names and content only

use dirvault::tree::hasher::{fingerprint_files, fingerprint_subtree};
use dirvault::tree::walker::{list_files, WalkerConfig};
use dirvault::types::Fingerprint;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn files_fingerprint(dir: &Path) -> Fingerprint {
    let files = list_files(dir, false).unwrap();
    fingerprint_files(dir, &files, "checksum.txt").unwrap().fingerprint
}

/// Same tree in two locations, created in opposite orders
#[test]
fn test_same_content_same_fingerprint_across_locations() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    fs::write(first.path().join("a.txt"), "a").unwrap();
    fs::write(first.path().join("b.txt"), "b").unwrap();
    fs::write(second.path().join("b.txt"), "b").unwrap();
    fs::write(second.path().join("a.txt"), "a").unwrap();

    assert_eq!(files_fingerprint(first.path()), files_fingerprint(second.path()));
}

#[test]
fn test_swapped_contents_change_fingerprint() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    fs::write(first.path().join("a.txt"), "one").unwrap();
    fs::write(first.path().join("b.txt"), "two").unwrap();
    fs::write(second.path().join("a.txt"), "two").unwrap();
    fs::write(second.path().join("b.txt"), "one").unwrap();

    assert_ne!(files_fingerprint(first.path()), files_fingerprint(second.path()));
}

#[test]
fn test_checksum_artifact_does_not_feed_fingerprint() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
    let before = files_fingerprint(temp_dir.path());

    fs::write(temp_dir.path().join("checksum.txt"), "anything").unwrap();
    assert_eq!(files_fingerprint(temp_dir.path()), before);
}

#[test]
fn test_subtree_fingerprint_tracks_nested_paths() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("x")).unwrap();
    fs::write(root.join("x").join("f.txt"), "f").unwrap();
    let config = WalkerConfig::default();
    let nested = fingerprint_subtree(root, &config).unwrap();

    // Same file moved one level up
    fs::rename(root.join("x").join("f.txt"), root.join("f.txt")).unwrap();
    let flat = fingerprint_subtree(root, &config).unwrap();
    assert_ne!(nested, flat);

    // Directories without files do not contribute
    fs::create_dir_all(root.join("y").join("z")).unwrap();
    assert_eq!(fingerprint_subtree(root, &config).unwrap(), flat);
}

#[test]
fn test_no_files_yields_sentinel() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("only_dirs")).unwrap();

    assert!(fingerprint_subtree(temp_dir.path(), &WalkerConfig::default())
        .unwrap()
        .is_empty_sentinel());
    assert!(files_fingerprint(temp_dir.path()).is_empty_sentinel());
}
