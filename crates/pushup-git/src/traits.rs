//! Trait abstractions for git operations.
//!
//! The sync loop only ever needs two things from git: run a subcommand and
//! get its output, and turn a ref into a revision id. Keeping those behind
//! traits lets the loop run against an in-memory fake in tests.

use crate::Result;

/// Whether git's stderr reaches the user's console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Forward captured stderr to our own stderr once the command exits.
    #[default]
    Forward,
    /// Keep stderr inside the returned error only.
    ///
    /// Meant for routine commands that are expected to fail now and then,
    /// like a rejected push.
    Quiet,
}

/// Runs git subcommands against a repository.
///
/// One call spawns exactly one process and blocks until it exits. Any
/// nonzero exit is an error carrying the captured output; the caller decides
/// whether that failure was expected.
#[allow(clippy::missing_errors_doc)]
pub trait CommandRunner {
    /// Run `git <args...>` and return its stdout.
    fn run(&self, verbosity: Verbosity, args: &[&str]) -> Result<Vec<u8>>;
}

/// Resolves symbolic references to revision ids.
#[allow(clippy::missing_errors_doc)]
pub trait RevisionResolver {
    /// Resolve `reference` (e.g. `HEAD`) to a revision id.
    ///
    /// The id is opaque: only compare it for equality or use it as a range
    /// endpoint.
    fn rev_parse(&self, reference: &str) -> Result<String>;
}
