//! Error types for pushup-git.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running git.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The location does not resolve to a git repository.
    #[error("not a git repository: {path}: {reason}")]
    NotARepository {
        /// The location that was tried.
        path: PathBuf,
        /// What git had to say about it.
        reason: String,
    },

    /// git ran but exited unsuccessfully.
    #[error("`{command}` failed ({}): {}", exit_label(.code), .stderr.trim())]
    CommandFailed {
        /// The full command line, e.g. `git push --porcelain`.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The git binary could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// The command line that was attempted.
        command: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// git produced output we could not make sense of.
    #[error("unexpected output from `{command}`: {output:?}")]
    UnexpectedOutput {
        /// The command line whose output was rejected.
        command: String,
        /// The offending output.
        output: String,
    },
}

impl Error {
    /// Captured stdout of a failed command, if any.
    #[must_use]
    pub fn stdout(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { stdout, .. } => Some(stdout),
            _ => None,
        }
    }
}

#[allow(clippy::ref_option)]
fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "killed by signal".into(), |c| format!("exit status {c}"))
}
