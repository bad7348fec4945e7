//! Repository handle that shells out to the `git` binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::{CommandRunner, RevisionResolver, Verbosity};

/// A git repository, addressed the way git itself addresses one.
///
/// `git_dir` is exported as `GIT_DIR` to every command when set, and
/// `work_tree` becomes the command's working directory. With neither set,
/// git discovers the repository from the process's current directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    git_dir: Option<PathBuf>,
    work_tree: Option<PathBuf>,
}

impl Repository {
    /// Open the repository at `git_dir`, or the one containing the current
    /// directory when `None`.
    ///
    /// # Errors
    /// Returns `NotARepository` if git cannot resolve the location.
    pub fn discover(git_dir: Option<PathBuf>) -> Result<Self> {
        let repo = Self {
            git_dir,
            work_tree: None,
        };
        repo.absolute_git_dir()?;
        Ok(repo)
    }

    /// Derive a handle for the repository rooted at `dir`.
    ///
    /// Both layouts work: for a normal clone the metadata lives in
    /// `dir/.git`, for a bare repository `dir` is the metadata store. The
    /// work tree is taken from git's own worktree listing rather than
    /// assumed to be `dir`.
    ///
    /// # Errors
    /// Returns `NotARepository` if `dir` is not a repository, or
    /// `UnexpectedOutput` if the worktree listing cannot be parsed.
    pub fn open_in(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let dot_git = dir.join(".git");
        let git_dir = match dot_git.try_exists() {
            Ok(true) => dot_git,
            Ok(false) => dir.to_path_buf(),
            Err(e) => {
                return Err(Error::NotARepository {
                    path: dot_git,
                    reason: e.to_string(),
                });
            }
        };

        let probe = Self {
            git_dir: Some(git_dir),
            work_tree: None,
        };
        let work_tree = probe.main_worktree().map_err(|e| match e {
            Error::CommandFailed { stderr, .. } => Error::NotARepository {
                path: dir.to_path_buf(),
                reason: stderr.trim().to_string(),
            },
            other => other,
        })?;

        Ok(Self {
            work_tree: Some(work_tree),
            ..probe
        })
    }

    /// The `GIT_DIR` override, if any.
    #[must_use]
    pub fn git_dir(&self) -> Option<&Path> {
        self.git_dir.as_deref()
    }

    /// The working directory commands run in, if any.
    #[must_use]
    pub fn work_tree(&self) -> Option<&Path> {
        self.work_tree.as_deref()
    }

    /// Ask git where the metadata store actually is.
    ///
    /// # Errors
    /// Returns `NotARepository` if git cannot find a repository.
    pub fn absolute_git_dir(&self) -> Result<PathBuf> {
        match self.run(Verbosity::Quiet, &["rev-parse", "--absolute-git-dir"]) {
            Ok(out) => Ok(PathBuf::from(String::from_utf8_lossy(&out).trim())),
            Err(Error::CommandFailed { stderr, .. }) => Err(Error::NotARepository {
                path: self.location(),
                reason: stderr.trim().to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Path of the first entry of `git worktree list --porcelain`.
    fn main_worktree(&self) -> Result<PathBuf> {
        let args = ["worktree", "list", "--porcelain"];
        let out = self.run(Verbosity::Quiet, &args)?;
        let text = String::from_utf8_lossy(&out);

        text.lines()
            .next()
            .and_then(|line| line.strip_prefix("worktree "))
            .map(PathBuf::from)
            .ok_or_else(|| Error::UnexpectedOutput {
                command: command_line(&args),
                output: text.into_owned(),
            })
    }

    fn location(&self) -> PathBuf {
        self.git_dir
            .clone()
            .or_else(|| self.work_tree.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl CommandRunner for Repository {
    fn run(&self, verbosity: Verbosity, args: &[&str]) -> Result<Vec<u8>> {
        let command = command_line(args);
        debug!(%command, git_dir = ?self.git_dir, work_tree = ?self.work_tree, "executing");

        let mut cmd = Command::new("git");
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(git_dir) = &self.git_dir {
            cmd.env("GIT_DIR", git_dir);
        }
        if let Some(work_tree) = &self.work_tree {
            cmd.current_dir(work_tree);
        }

        let output = cmd.output().map_err(|source| Error::Spawn {
            command: command.clone(),
            source,
        })?;

        if verbosity == Verbosity::Forward && !output.stderr.is_empty() {
            // Best effort: a closed stderr must not turn a good run into a failure.
            let _ = std::io::stderr().write_all(&output.stderr);
        }

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(Error::CommandFailed {
                command,
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

impl RevisionResolver for Repository {
    fn rev_parse(&self, reference: &str) -> Result<String> {
        let out = self.run(Verbosity::Forward, &["rev-parse", reference])?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }
}

fn command_line(args: &[&str]) -> String {
    let mut line = String::from("git");
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
