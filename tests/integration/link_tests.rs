#![cfg(unix)]

use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use dupescan::scanner::WalkerConfig;
use std::fs;
use std::os::unix::fs::symlink;
use tempfile::tempdir;

#[test]
fn test_file_symlink_resolves_to_target() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target.bin");
    fs::write(&target, vec![9u8; 3000]).unwrap();
    symlink(&target, dir.path().join("link.bin")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    // Both entries resolve to the same real path.
    let real = target.canonicalize().unwrap();
    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
    assert!(groups[0].files.iter().all(|p| *p == real));
}

#[test]
fn test_same_content_through_symlinked_root() {
    let data = tempdir().unwrap();
    let other = tempdir().unwrap();
    fs::write(data.path().join("a"), vec![4u8; 2500]).unwrap();
    fs::write(data.path().join("b"), vec![4u8; 2500]).unwrap();
    let alias = other.path().join("alias");
    symlink(data.path(), &alias).unwrap();

    let (direct, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[data.path().to_path_buf()])
        .unwrap();
    let (via_link, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[alias])
        .unwrap();

    assert_eq!(direct, via_link);
}

#[test]
fn test_symlinked_directory_not_descended_by_default() {
    let data = tempdir().unwrap();
    let scan = tempdir().unwrap();
    fs::write(data.path().join("a"), vec![5u8; 2500]).unwrap();
    fs::write(scan.path().join("b"), vec![5u8; 2500]).unwrap();
    symlink(data.path(), scan.path().join("linked")).unwrap();

    let root = [scan.path().to_path_buf()];
    let (groups, summary) = DuplicateFinder::with_defaults().find_duplicates(&root).unwrap();
    assert_eq!(summary.total_files, 1);
    assert!(groups.is_empty());

    let follow = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_follow_dir_symlinks(true));
    let (groups, summary) = DuplicateFinder::new(follow).find_duplicates(&root).unwrap();
    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_dangling_symlink_is_recoverable() {
    let dir = tempdir().unwrap();
    symlink(dir.path().join("nowhere"), dir.path().join("dangling")).unwrap();
    fs::write(dir.path().join("a"), vec![6u8; 2100]).unwrap();
    fs::write(dir.path().join("b"), vec![6u8; 2100]).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.scan_errors.len(), 1);
    assert!(summary.scan_errors[0].is_recoverable());
}
