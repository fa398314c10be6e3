use clap::Parser;
use dupescan::cli::Cli;
use dupescan::error::ExitCode;
use dupescan::run_app;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn cli(args: &[&str], config_dir: &Path) -> Cli {
    let config = config_dir.join("absent.toml");
    let mut argv = vec!["dupescan", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

fn tree_with_duplicates() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), vec![b'x'; 3000]).unwrap();
    fs::write(dir.path().join("b"), vec![b'x'; 3000]).unwrap();
    fs::write(dir.path().join("c"), vec![b'y'; 3000]).unwrap();
    dir
}

#[test]
fn test_run_app_duplicates_found() {
    let _lock = crate::env_lock();
    let dir = tree_with_duplicates();
    let root = dir.path().to_str().unwrap();

    let code = run_app(cli(&["-q", root], dir.path())).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_run_app_no_duplicates() {
    let _lock = crate::env_lock();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lonely"), vec![1u8; 3000]).unwrap();
    let root = dir.path().to_str().unwrap();

    let code = run_app(cli(&["-q", root], dir.path())).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_run_app_json_output() {
    let _lock = crate::env_lock();
    let dir = tree_with_duplicates();
    let root = dir.path().to_str().unwrap();

    let code = run_app(cli(&["-q", "--output", "json", root], dir.path())).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_run_app_partial_success_with_bad_root() {
    let _lock = crate::env_lock();
    let dir = tree_with_duplicates();
    let root = dir.path().to_str().unwrap();
    let missing = dir.path().join("missing");

    let code = run_app(cli(&["-q", root, missing.to_str().unwrap()], dir.path())).unwrap();
    assert_eq!(code, ExitCode::PartialSuccess);
}

#[test]
fn test_run_app_no_valid_roots_is_error() {
    let _lock = crate::env_lock();
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = run_app(cli(&["-q", missing.to_str().unwrap()], dir.path())).unwrap_err();
    assert!(format!("{err:#}").contains("No valid paths"));
}

#[test]
fn test_run_app_rejects_zero_threads() {
    let _lock = crate::env_lock();
    let dir = tempdir().unwrap();
    let root = dir.path().to_str().unwrap();

    assert!(run_app(cli(&["--io-threads", "0", root], dir.path())).is_err());
}

#[test]
fn test_run_app_rejects_oversized_partial_size() {
    let _lock = crate::env_lock();
    let dir = tree_with_duplicates();
    let root = dir.path().to_str().unwrap();

    let err = run_app(cli(&["-q", "--partial-size", "9EiB", root], dir.path())).unwrap_err();
    assert!(format!("{err:#}").contains("partial_size"));
}

#[test]
fn test_run_app_print_config() {
    let _lock = crate::env_lock();
    let dir = tempdir().unwrap();
    let code = run_app(cli(&["--print-config"], dir.path())).unwrap();
    assert_eq!(code, ExitCode::Success);
}
