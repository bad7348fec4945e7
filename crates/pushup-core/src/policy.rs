//! Which paths are safe to merge without a human looking.
//!
//! Patterns use `.gitignore` syntax (see `man gitignore`) and are compiled
//! with the `ignore` crate's gitignore matcher, so `*`, `**`, trailing `/`
//! and leading `!` behave exactly as they do in a `.gitignore` file.

use std::fmt;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::{Error, Result};

/// A compiled, non-empty set of ignore patterns.
#[derive(Clone)]
pub struct ConflictPolicy {
    patterns: Vec<String>,
    matcher: Gitignore,
}

impl ConflictPolicy {
    /// Compile `patterns` into a matcher.
    ///
    /// # Errors
    /// Returns `NoIgnorePatterns` for an empty set and `InvalidPattern` for
    /// the first pattern that is not a valid glob.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Err(Error::NoIgnorePatterns);
        }

        // Candidate paths come from `git diff --name-only` and are already
        // relative to the work tree root, so no root is stripped.
        let mut builder = GitignoreBuilder::new(".");
        for pattern in patterns {
            let pattern = pattern.as_ref();
            builder
                .add_line(None, pattern)
                .map_err(|e| Error::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })?;
        }
        let matcher = builder.build().map_err(|e| Error::InvalidPattern {
            pattern: patterns
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(", "),
            message: e.to_string(),
        })?;

        Ok(Self {
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
            matcher,
        })
    }

    /// The patterns as given, in order.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether `path` (relative to the work tree root) is covered.
    ///
    /// A path is covered when it, or any directory containing it, matches.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(path, false)
            .is_ignore()
    }

    /// The first path in `paths` that is not covered.
    #[must_use]
    pub fn first_violation<'p, I>(&self, paths: I) -> Option<&'p str>
    where
        I: IntoIterator<Item = &'p str>,
    {
        paths.into_iter().find(|path| !self.matches(path))
    }
}

impl fmt::Debug for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConflictPolicy")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}
