//! In-memory git for exercising the sync loop.
//!
//! `MockGit` implements both git traits. Push results and `HEAD` values are
//! consumed in order; diffs are looked up by their `before..after` range.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use pushup_git::{
    CommandRunner, Error as GitError, Result as GitResult, RevisionResolver, Verbosity,
};

#[derive(Default)]
pub struct MockGit {
    push_results: RefCell<VecDeque<bool>>,
    heads: RefCell<VecDeque<String>>,
    diffs: HashMap<String, Vec<String>>,
    pull_fails: bool,
    calls: RefCell<Vec<(String, Option<Verbosity>)>>,
}

impl MockGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcomes of successive pushes; once exhausted every push is rejected.
    pub fn with_push_results(self, results: &[bool]) -> Self {
        self.push_results.borrow_mut().extend(results.iter().copied());
        self
    }

    /// Successive values of `HEAD`; once exhausted `rev-parse` fails.
    pub fn with_heads<S: AsRef<str>>(self, heads: &[S]) -> Self {
        self.heads
            .borrow_mut()
            .extend(heads.iter().map(|h| h.as_ref().to_string()));
        self
    }

    pub fn with_diff<S: AsRef<str>>(mut self, range: &str, paths: &[S]) -> Self {
        self.diffs.insert(
            range.to_string(),
            paths.iter().map(|p| p.as_ref().to_string()).collect(),
        );
        self
    }

    pub const fn with_pull_failure(mut self) -> Self {
        self.pull_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(c, _)| c.clone()).collect()
    }

    /// Number of recorded commands starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(c, _)| c.starts_with(prefix))
            .count()
    }

    /// Verbosity of every command that went through the runner.
    pub fn verbosities(&self) -> Vec<(String, Verbosity)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|(c, v)| v.map(|v| (c.clone(), v)))
            .collect()
    }

    fn failure(command: &str, stderr: &str) -> GitError {
        GitError::CommandFailed {
            command: format!("git {command}"),
            code: Some(1),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

impl CommandRunner for MockGit {
    fn run(&self, verbosity: Verbosity, args: &[&str]) -> GitResult<Vec<u8>> {
        let command = args.join(" ");
        self.calls
            .borrow_mut()
            .push((command.clone(), Some(verbosity)));

        match args {
            ["push", ..] => {
                if self.push_results.borrow_mut().pop_front().unwrap_or(false) {
                    Ok(b"To origin\n=\tHEAD:refs/heads/main\t[up to date]\nDone\n".to_vec())
                } else {
                    Err(Self::failure(&command, "! [rejected] (fetch first)"))
                }
            }
            ["pull", ..] if self.pull_fails => Err(Self::failure(&command, "CONFLICT")),
            ["pull", ..] => Ok(Vec::new()),
            ["diff", "-z", "--name-only", range] => {
                let mut out = Vec::new();
                for path in self.diffs.get(*range).into_iter().flatten() {
                    out.extend_from_slice(path.as_bytes());
                    out.push(0);
                }
                Ok(out)
            }
            _ => Err(Self::failure(&command, "unexpected command")),
        }
    }
}

impl RevisionResolver for MockGit {
    fn rev_parse(&self, reference: &str) -> GitResult<String> {
        let command = format!("rev-parse {reference}");
        self.calls.borrow_mut().push((command.clone(), None));
        self.heads
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Self::failure(&command, "unknown revision"))
    }
}
