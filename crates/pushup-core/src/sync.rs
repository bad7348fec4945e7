//! The push/pull/check retry loop.
//!
//! Each attempt tries `git push --porcelain`. A successful push ends the run.
//! A rejected push is expected: the loop records `HEAD`, pulls, records `HEAD`
//! again, and checks every path in `before..after` against the
//! [`ConflictPolicy`]. Any uncovered path stops the run with
//! [`Error::RuleViolation`]; otherwise the next attempt pushes again.
//!
//! A pull failure, a resolution failure, or a rule violation ends the run
//! immediately without consuming the rest of the budget. Running out of
//! attempts ends it with [`Error::RetriesExhausted`].
//!
//! In dry-run mode no push is ever issued. The loop behaves as if the push
//! was rejected, runs a single pull and check, and stops.

use std::fmt;

use pushup_git::{CommandRunner, RevisionResolver, Verbosity};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SyncOptions;
use crate::error::{Error, Result};
use crate::policy::ConflictPolicy;

/// Two points in history; the changes a pull brought in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionRange {
    /// `HEAD` before the pull.
    pub before: String,
    /// `HEAD` after the pull.
    pub after: String,
}

impl RevisionRange {
    /// Create a range.
    #[must_use]
    pub const fn new(before: String, after: String) -> Self {
        Self { before, after }
    }

    /// Whether the pull left `HEAD` where it was.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.before == self.after
    }
}

impl fmt::Display for RevisionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.before, self.after)
    }
}

/// One pull followed by a passing rule check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullCheck {
    /// The attempt this pull belonged to, starting at 1.
    pub attempt: u32,
    /// What the pull moved `HEAD` across.
    pub range: RevisionRange,
    /// Paths changed in `range`, all covered by the policy.
    pub changed_paths: Vec<String>,
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The push went through.
    Pushed {
        /// The attempt on which the push succeeded.
        attempts: u32,
        /// Every pull made before that, in order.
        pulls: Vec<PullCheck>,
    },
    /// Dry run: one pull and check, no push.
    DryRun {
        /// The single pull and check.
        check: PullCheck,
    },
}

/// Runs the retry loop against a repository.
///
/// The loop only borrows its git capabilities, so tests can hand it an
/// in-memory fake for both.
pub struct SyncLoop<'a, R: CommandRunner, V: RevisionResolver> {
    runner: &'a R,
    resolver: &'a V,
    policy: ConflictPolicy,
    options: SyncOptions,
}

impl<'a, R: CommandRunner, V: RevisionResolver> SyncLoop<'a, R, V> {
    /// Create a loop, compiling the ignore patterns up front.
    ///
    /// # Errors
    /// Returns a configuration error if the options are invalid; no git
    /// command has run at that point.
    pub fn new(runner: &'a R, resolver: &'a V, options: SyncOptions) -> Result<Self> {
        options.validate()?;
        let policy = ConflictPolicy::compile(&options.ignore)?;
        Ok(Self {
            runner,
            resolver,
            policy,
            options,
        })
    }

    /// The compiled policy.
    #[must_use]
    pub const fn policy(&self) -> &ConflictPolicy {
        &self.policy
    }

    /// Run until the push succeeds, a check fails, or the budget is gone.
    ///
    /// # Errors
    /// See the module docs for which failures end the run.
    pub fn run(&self) -> Result<SyncOutcome> {
        let budget = self.options.retries;
        let mut pulls = Vec::new();

        for attempt in 1..=budget {
            info!("attempt {attempt} of {budget}");

            if !self.options.dry_run && self.push()? {
                return Ok(SyncOutcome::Pushed {
                    attempts: attempt,
                    pulls,
                });
            }

            let check = self.pull_and_check(attempt)?;

            if self.options.dry_run {
                return Ok(SyncOutcome::DryRun { check });
            }
            pulls.push(check);
        }

        Err(Error::RetriesExhausted { attempts: budget })
    }

    /// Try to push. `Ok(false)` means the push was rejected.
    fn push(&self) -> Result<bool> {
        info!("pushing...");
        match self
            .runner
            .run(self.options.routine_verbosity, &["push", "--porcelain"])
        {
            Ok(out) => {
                debug!("git push out:\n{}", String::from_utf8_lossy(&out));
                Ok(true)
            }
            Err(e) => {
                warn!("git push error: {e}");
                if let Some(out) = e.stdout() {
                    debug!("git push out:\n{out}");
                }
                Ok(false)
            }
        }
    }

    fn pull_and_check(&self, attempt: u32) -> Result<PullCheck> {
        let before = self.head()?;

        info!("pulling...");
        self.runner
            .run(self.options.routine_verbosity, &self.options.pull_args())
            .map_err(|e| {
                if let Some(out) = e.stdout() {
                    debug!("pull out:\n{out}");
                }
                Error::Pull(e)
            })?;

        let after = self.head()?;
        let range = RevisionRange::new(before, after);
        let changed_paths = self.check_rules(&range)?;

        Ok(PullCheck {
            attempt,
            range,
            changed_paths,
        })
    }

    fn head(&self) -> Result<String> {
        self.resolver.rev_parse("HEAD").map_err(Error::Resolution)
    }

    /// Fail if any path changed in `range` is outside the policy.
    fn check_rules(&self, range: &RevisionRange) -> Result<Vec<String>> {
        info!("before..after: {range}");

        // NUL-separated so git never C-quotes unusual paths.
        let revisions = range.to_string();
        let out = self
            .runner
            .run(Verbosity::Forward, &["diff", "-z", "--name-only", &revisions])?;
        let changed: Vec<String> = out
            .split(|&b| b == 0)
            .filter(|path| !path.is_empty())
            .map(|path| String::from_utf8_lossy(path).into_owned())
            .collect();

        for path in &changed {
            info!("{path}");
        }

        if let Some(path) = self
            .policy
            .first_violation(changed.iter().map(String::as_str))
        {
            return Err(Error::RuleViolation {
                path: path.to_string(),
                patterns: self.policy.patterns().to_vec(),
            });
        }

        Ok(changed)
    }
}
