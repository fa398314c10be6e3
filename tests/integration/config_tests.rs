use clap::Parser;
use dupescan::cli::Cli;
use dupescan::config::Config;
use std::fs;
use tempfile::tempdir;

fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("DUPESCAN_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_layering_order() {
    let _lock = crate::env_lock();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "min_size = 100\npartial_size = 1024\nio_threads = 2\nprogress_interval = 50\n",
    )
    .unwrap();

    std::env::set_var("DUPESCAN_PARTIAL_SIZE", "2048");
    std::env::set_var("DUPESCAN_IO_THREADS", "3");
    let loaded = Config::load_from_path(&path);
    clear_env();
    let mut config = loaded.unwrap();

    let cli = Cli::try_parse_from(["dupescan", "/data", "--io-threads", "8"]).unwrap();
    config.merge_cli(&cli);

    assert_eq!(config.min_size, 100); // file
    assert_eq!(config.partial_size, 2048); // env over file
    assert_eq!(config.io_threads, 8); // cli over env
    assert_eq!(config.progress_interval, 50); // file
    assert_eq!(config.chunk_size, 65536); // default
}

#[test]
fn test_load_or_default_with_explicit_path() {
    let _lock = crate::env_lock();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "follow_symlinks = true\n").unwrap();

    let config = Config::load_or_default(Some(&path)).unwrap();
    assert!(config.follow_symlinks);
}

#[test]
fn test_invalid_values_fail_validation() {
    let _lock = crate::env_lock();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "chunk_size = 0\n").unwrap();

    let config = Config::load_from_path(&path).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("chunk_size"));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let _lock = crate::env_lock();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "min_size = 7\ncolour = \"blue\"\n").unwrap();

    assert_eq!(Config::load_from_path(&path).unwrap().min_size, 7);
}
