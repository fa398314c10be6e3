use dupescan::duplicates::{DuplicateFinder, FinderError};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_duplicates_across_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("photo.jpg"), vec![7u8; 4096]).unwrap();
    fs::write(second.path().join("copy.jpg"), vec![7u8; 4096]).unwrap();

    let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots)
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.total_files, 2);
    assert_eq!(
        groups[0].files,
        vec![
            first.path().join("photo.jpg").canonicalize().unwrap(),
            second.path().join("copy.jpg").canonicalize().unwrap(),
        ]
    );
}

#[test]
fn test_empty_root_list_is_fatal() {
    let result = DuplicateFinder::with_defaults().find_duplicates(&[]);
    assert!(matches!(result, Err(FinderError::NoRoots)));
}

#[test]
fn test_only_invalid_roots_is_fatal() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, b"not a directory").unwrap();
    let missing = dir.path().join("missing");

    let result = DuplicateFinder::with_defaults().find_duplicates(&[missing.clone(), file.clone()]);

    match result {
        Err(FinderError::NoValidRoots(paths)) => assert_eq!(paths, vec![missing, file]),
        other => panic!("expected NoValidRoots, got {:?}", other.map(|(g, _)| g.len())),
    }
}

#[test]
fn test_invalid_root_is_skipped() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), vec![1u8; 2048]).unwrap();
    fs::write(dir.path().join("b"), vec![1u8; 2048]).unwrap();

    let roots = vec![PathBuf::from("/definitely/not/here"), dir.path().to_path_buf()];
    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots)
        .unwrap();

    assert_eq!(groups.len(), 1);
}

#[test]
fn test_overlapping_roots_report_same_path_twice() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only"), vec![3u8; 5000]).unwrap();

    let roots = vec![dir.path().to_path_buf(), dir.path().to_path_buf()];
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots)
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files[0], groups[0].files[1]);
}
