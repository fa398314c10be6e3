use dupescan::duplicates::{extract_duplicates, group_by_size, regroup, RegroupConfig};
use dupescan::scanner::{FileEntry, HashError, HashMode, Hasher};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn entry(path: PathBuf) -> FileEntry {
    let size = fs::metadata(&path).unwrap().len();
    FileEntry::new(path, size)
}

#[test]
fn test_file_vanishing_before_full_hash_breaks_pair() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, vec![1u8; 3000]).unwrap();
    fs::write(&b, vec![1u8; 3000]).unwrap();

    let hasher = Hasher::new();
    let config = RegroupConfig::default();
    let (by_size, _) = group_by_size(vec![entry(a.clone()), entry(b.clone())], 2000);
    let (by_partial, _) = regroup(by_size, &hasher, HashMode::Partial, &config);
    assert_eq!(by_partial.len(), 1);

    fs::remove_file(&b).unwrap();
    let (by_full, stats) = regroup(by_partial, &hasher, HashMode::Full, &config);

    assert_eq!(stats.failed_files, 1);
    assert!(matches!(&stats.errors[0], HashError::NotFound(p) if *p == b));
    assert_eq!(by_full.total_files(), 1);
    assert!(extract_duplicates(by_full).is_empty());
}

#[test]
fn test_failure_leaves_remaining_members_grouped() {
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = (0..3).map(|i| dir.path().join(format!("f{i}"))).collect();
    for path in &paths {
        fs::write(path, vec![2u8; 2500]).unwrap();
    }

    let hasher = Hasher::new();
    let config = RegroupConfig::default();
    let (by_size, _) = group_by_size(paths.iter().cloned().map(entry).collect::<Vec<_>>(), 2000);
    let (by_partial, _) = regroup(by_size, &hasher, HashMode::Partial, &config);

    fs::remove_file(&paths[1]).unwrap();
    let (by_full, stats) = regroup(by_partial, &hasher, HashMode::Full, &config);
    let duplicates = extract_duplicates(by_full);

    assert_eq!(stats.failed_files, 1);
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].files, vec![paths[0].clone(), paths[2].clone()]);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_does_not_abort_scan() {
    use dupescan::duplicates::DuplicateFinder;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("hidden"), vec![8u8; 2200]).unwrap();
    fs::write(dir.path().join("a"), vec![8u8; 2200]).unwrap();
    fs::write(dir.path().join("b"), vec![8u8; 2200]).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let result = DuplicateFinder::with_defaults().find_duplicates(&[dir.path().to_path_buf()]);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (groups, _) = result.unwrap();
    // Root can still read the directory, so the group has two or three members.
    assert_eq!(groups.len(), 1);
    assert!(groups[0].len() >= 2);
}
