use dupescan::duplicates::{DuplicateFinder, FinderConfig, GroupKey};
use dupescan::scanner::{HashMode, Hasher};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.canonicalize().unwrap()
}

fn filled(byte: u8, len: usize) -> Vec<u8> {
    vec![byte; len]
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_reference_scenario() {
    // a and b share content X, c has different content Y of the same size,
    // d carries X but sits under the minimum size.
    let dir = tempdir().unwrap();
    let a = write(&dir.path().join("a"), &filled(b'x', 3000));
    let b = write(&dir.path().join("sub/b"), &filled(b'x', 3000));
    write(&dir.path().join("c"), &filled(b'y', 3000));
    write(&dir.path().join("d"), &filled(b'x', 1000));

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(groups.len(), 1);
    let mut members = groups[0].files.clone();
    members.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(members, expected);

    assert_eq!(groups[0].size(), 3000);
    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.below_min_size, 1);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 3000);
    assert!(!summary.has_errors());
}

#[test]
fn test_group_id_matches_key_lineage() {
    let dir = tempdir().unwrap();
    let a = write(&dir.path().join("a"), &filled(b'q', 2500));
    write(&dir.path().join("b"), &filled(b'q', 2500));

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    let hasher = Hasher::new();
    let expected = GroupKey::from_size(2500)
        .with_digest(HashMode::Partial, hasher.hash(&a, HashMode::Partial).unwrap())
        .with_digest(HashMode::Full, hasher.hash(&a, HashMode::Full).unwrap());

    assert_eq!(groups[0].key, expected);
    assert_eq!(groups[0].id(), expected.id());
    assert_eq!(groups[0].id().split('-').count(), 3);
}

#[test]
fn test_files_at_exact_minimum_are_considered() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), &filled(b'm', 2000));
    write(&dir.path().join("b"), &filled(b'm', 2000));
    write(&dir.path().join("c"), &filled(b'm', 1999));
    write(&dir.path().join("d"), &filled(b'm', 1999));

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size(), 2000);
    assert_eq!(summary.below_min_size, 2);
}

#[test]
fn test_custom_min_size() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"tiny");
    write(&dir.path().join("b"), b"tiny");

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(1));
    let (groups, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_same_size_different_content_not_grouped() {
    let dir = tempdir().unwrap();
    let mut first = filled(b'z', 100_000);
    let mut second = first.clone();
    // Differ past the partial-hash window only.
    first[90_000] = b'1';
    second[90_000] = b'2';
    write(&dir.path().join("first"), &first);
    write(&dir.path().join("second"), &second);

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.eliminated_by_partial, 0);
    assert_eq!(summary.eliminated_by_full, 2);
}

#[test]
fn test_partial_hash_splits_early_differences() {
    let dir = tempdir().unwrap();
    let mut first = filled(b'k', 5000);
    first[0] = b'A';
    write(&dir.path().join("first"), &first);
    write(&dir.path().join("second"), &filled(b'k', 5000));

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.eliminated_by_partial, 2);
}

#[test]
fn test_multiple_groups_are_disjoint() {
    let dir = tempdir().unwrap();
    for i in 0..3 {
        write(&dir.path().join(format!("x{i}")), &filled(b'x', 4000));
        write(&dir.path().join(format!("y{i}")), &filled(b'y', 4000));
    }
    write(&dir.path().join("z0"), &filled(b'z', 8000));
    write(&dir.path().join("z1"), &filled(b'z', 8000));

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 3);
    let mut all: Vec<_> = groups.iter().flat_map(|g| g.files.clone()).collect();
    let total = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), total);
    assert_eq!(total, 8);
    assert_eq!(summary.duplicate_files, 5);
}

#[test]
fn test_idempotent_runs() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        write(&dir.path().join(format!("d{i}/same")), &filled(b's', 3333));
    }
    write(&dir.path().join("other"), &filled(b'o', 3333));

    let finder = DuplicateFinder::with_defaults();
    let (first, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();
    let (second, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_parallel_hashing_matches_sequential() {
    let dir = tempdir().unwrap();
    for i in 0..10 {
        let byte = b'a' + (i % 3) as u8;
        write(&dir.path().join(format!("f{i}")), &filled(byte, 6000));
    }

    let root = [dir.path().to_path_buf()];
    let (sequential, _) = DuplicateFinder::with_defaults().find_duplicates(&root).unwrap();
    let (parallel, _) = DuplicateFinder::new(FinderConfig::default().with_io_threads(4))
        .find_duplicates(&root)
        .unwrap();

    assert_eq!(sequential, parallel);
    assert_eq!(sequential.len(), 3);
}
