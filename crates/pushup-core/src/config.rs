//! Configuration for a pushup run.
//!
//! Settings come from three layers: command-line flags, the optional
//! `pushup.toml` in the repository's git dir, and built-in defaults. The
//! CLI folds them into one [`SyncOptions`] value that the sync loop takes by
//! value and never changes.

use std::fs;
use std::path::{Path, PathBuf};

use pushup_git::Verbosity;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Retry budget when none is configured.
pub const DEFAULT_RETRIES: u32 = 10;

/// Contents of `<git-dir>/pushup.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Sync loop settings.
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Config {
    const FILE_NAME: &'static str = "pushup.toml";

    /// Location of the config file for the repository whose metadata lives
    /// in `git_dir`.
    #[must_use]
    pub fn path_in(git_dir: &Path) -> PathBuf {
        git_dir.join(Self::FILE_NAME)
    }

    /// Load config from a TOML file. A missing file yields defaults.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            file: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }
}

/// The `[sync]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Patterns used when none are given on the command line.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Number of push attempts.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Pull with `--rebase` (true) or `--no-rebase` (false).
    #[serde(default = "default_rebase")]
    pub rebase: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            retries: default_retries(),
            rebase: default_rebase(),
        }
    }
}

const fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

const fn default_rebase() -> bool {
    true
}

/// Everything the sync loop needs to know, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Gitignore-style patterns naming paths that are safe to auto-merge.
    pub ignore: Vec<String>,
    /// Maximum number of push attempts.
    pub retries: u32,
    /// Pull with rebase rather than merge.
    pub rebase: bool,
    /// Never push; run one pull and check, then stop.
    pub dry_run: bool,
    /// How git's stderr is treated for push and pull, the commands that are
    /// expected to fail during a normal run.
    pub routine_verbosity: Verbosity,
}

impl SyncOptions {
    /// Options with the given patterns and every other setting at its default.
    #[must_use]
    pub const fn new(ignore: Vec<String>) -> Self {
        Self {
            ignore,
            retries: DEFAULT_RETRIES,
            rebase: true,
            dry_run: false,
            routine_verbosity: Verbosity::Quiet,
        }
    }

    /// Options seeded from the config file.
    #[must_use]
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.ignore.clone())
            .with_retries(config.retries)
            .with_rebase(config.rebase)
    }

    /// Replace the ignore patterns.
    #[must_use]
    pub fn with_ignore(mut self, ignore: Vec<String>) -> Self {
        self.ignore = ignore;
        self
    }

    /// Set the retry budget.
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Choose between `pull --rebase` and `pull --no-rebase`.
    #[must_use]
    pub const fn with_rebase(mut self, rebase: bool) -> Self {
        self.rebase = rebase;
        self
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set how git's stderr is handled for push and pull.
    #[must_use]
    pub const fn with_routine_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.routine_verbosity = verbosity;
        self
    }

    /// Check the invariants the loop relies on.
    ///
    /// # Errors
    /// Returns `NoIgnorePatterns` or `InvalidRetries`.
    pub fn validate(&self) -> Result<()> {
        if self.ignore.is_empty() {
            return Err(Error::NoIgnorePatterns);
        }
        if self.retries == 0 {
            return Err(Error::InvalidRetries(self.retries));
        }
        Ok(())
    }

    pub(crate) const fn pull_args(&self) -> [&'static str; 2] {
        if self.rebase {
            ["pull", "--rebase"]
        } else {
            ["pull", "--no-rebase"]
        }
    }
}
