//! # pushup-core
//!
//! Core library for git-pushup: the push/pull/check retry loop and the
//! path policy it enforces after every pull.
//!
//! A push rejected because the remote moved is retried after a
//! `git pull --rebase`, but only if every path the pull brought in matches
//! one of the operator's ignore patterns. Anything else stops the loop so a
//! human can look at it.

pub mod config;
pub mod error;
pub mod policy;
pub mod sync;

#[cfg(test)]
mod test_mocks;

pub use config::{Config, SyncConfig, SyncOptions};
pub use error::{Error, Result};
pub use policy::ConflictPolicy;
pub use sync::{PullCheck, RevisionRange, SyncLoop, SyncOutcome};
