//! Error types for pushup-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end a pushup run.
///
/// A rejected push is deliberately absent: it is the one expected failure
/// and only surfaces as [`Error::RetriesExhausted`] once the budget is gone.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No ignore patterns were configured.
    #[error("need at least one ignore pattern")]
    NoIgnorePatterns,

    /// An ignore pattern is not a valid glob.
    #[error("invalid ignore pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// Why the glob was rejected.
        message: String,
    },

    /// The retry budget must allow at least one attempt.
    #[error("retries must be a positive integer, got {0}")]
    InvalidRetries(u32),

    /// The configuration file could not be parsed.
    #[error("failed to parse {}: {message}", .file.display())]
    ConfigParse {
        /// The file that was read.
        file: PathBuf,
        /// The TOML parser's description of the problem.
        message: String,
    },

    /// A revision or the repository location could not be resolved.
    #[error("cannot resolve revision: {0}")]
    Resolution(#[source] pushup_git::Error),

    /// The pull itself failed.
    #[error("pull failed: {0}")]
    Pull(#[source] pushup_git::Error),

    /// The pull brought in a path outside the ignore patterns.
    #[error("{path:?} doesn't match ignore patterns {patterns:?}")]
    RuleViolation {
        /// The first offending path.
        path: String,
        /// The configured patterns, in order.
        patterns: Vec<String>,
    },

    /// Every attempt lost the push race.
    #[error("giving up after {attempts} retries")]
    RetriesExhausted {
        /// Number of push attempts made.
        attempts: u32,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other git failure.
    #[error("git error: {0}")]
    Git(#[from] pushup_git::Error),
}

impl Error {
    /// Whether this error stems from configuration rather than repository
    /// state. These are raised before any git command runs.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NoIgnorePatterns
                | Self::InvalidPattern { .. }
                | Self::InvalidRetries(_)
                | Self::ConfigParse { .. }
        )
    }
}
