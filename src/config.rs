//! Layered configuration.
//!
//! Settings are merged in order of increasing precedence:
//! built-in defaults, a TOML file, `DUPESCAN_*` environment variables,
//! then command-line flags.
//!
//! The TOML file is taken from `--config` when given, otherwise from the
//! platform config directory (`<config_dir>/dupescan/config.toml`). A missing
//! file is not an error.
//!
//! ```toml
//! min_size = 4096
//! partial_size = 65536
//! chunk_size = 65536
//! progress_interval = 1000
//! io_threads = 4
//! follow_symlinks = false
//! ```

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::duplicates::{FinderConfig, MIN_FILE_SIZE};
use crate::scanner::{WalkerConfig, CHUNK_SIZE, MAX_BUFFER_SIZE, PARTIAL_SIZE};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Effective scan configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files strictly smaller than this are ignored.
    pub min_size: u64,
    /// Leading bytes covered by the partial hash.
    pub partial_size: u64,
    /// Read buffer size for the full hash.
    pub chunk_size: u64,
    /// Walk progress is reported every this many files.
    pub progress_interval: usize,
    /// Threads hashing within a stage. 1 means sequential.
    pub io_threads: usize,
    /// Descend into symlinked directories.
    pub follow_symlinks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_size: MIN_FILE_SIZE,
            partial_size: PARTIAL_SIZE as u64,
            chunk_size: CHUNK_SIZE as u64,
            progress_interval: 1000,
            io_threads: 1,
            follow_symlinks: false,
        }
    }
}

impl Config {
    /// Load from the default platform path (or defaults if there is none).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or an
    /// environment override has the wrong type.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from_path(path),
            None => {
                log::debug!("No platform config directory, using defaults");
                Self::figment(None)
                    .extract()
                    .context("Invalid configuration")
            }
        }
    }

    /// Load with an explicit file path.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Config::load`].
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());
        Self::figment(Some(path))
            .extract()
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Load from `explicit` when given, otherwise from the default path.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Config::load`].
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Default configuration file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupescan").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line overrides.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(min_size) = cli.min_size {
            self.min_size = min_size;
        }
        if let Some(partial_size) = cli.partial_size {
            self.partial_size = partial_size;
        }
        if let Some(io_threads) = cli.io_threads {
            self.io_threads = io_threads;
        }
        if cli.follow_symlinks {
            self.follow_symlinks = true;
        }
    }

    /// Reject values the scan cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.partial_size == 0 {
            anyhow::bail!("partial_size must be greater than zero");
        }
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than zero");
        }
        if self.progress_interval == 0 {
            anyhow::bail!("progress_interval must be greater than zero");
        }
        if self.io_threads == 0 {
            anyhow::bail!("io_threads must be at least 1");
        }
        let max = MAX_BUFFER_SIZE as u64;
        if self.partial_size > max {
            anyhow::bail!("partial_size must be at most {} bytes", max);
        }
        if self.chunk_size > max {
            anyhow::bail!("chunk_size must be at most {} bytes", max);
        }
        Ok(())
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Build the finder configuration. Call [`Config::validate`] first.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        let walker = WalkerConfig::default()
            .with_progress_interval(self.progress_interval)
            .with_follow_dir_symlinks(self.follow_symlinks);

        FinderConfig::default()
            .with_min_size(self.min_size)
            .with_partial_size(usize::try_from(self.partial_size).unwrap_or(usize::MAX))
            .with_chunk_size(usize::try_from(self.chunk_size).unwrap_or(usize::MAX))
            .with_io_threads(self.io_threads)
            .with_walker_config(walker)
    }
}
