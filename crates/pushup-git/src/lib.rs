//! # pushup-git
//!
//! Thin git layer for git-pushup. Every operation spawns the `git` binary
//! as a subprocess and waits for it; nothing here links against libgit2.
//! The [`CommandRunner`] and [`RevisionResolver`] traits are the seams the
//! sync loop depends on, and [`Repository`] implements both.

mod error;
mod repository;
mod traits;

pub use error::{Error, Result};
pub use repository::Repository;
pub use traits::{CommandRunner, RevisionResolver, Verbosity};
