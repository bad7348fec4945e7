//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

pub mod completions;
pub mod pushup;

/// Push; if the remote moved, pull and retry as long as only safe files changed.
#[derive(Debug, Parser)]
#[command(name = "git-pushup")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Example:\n  git commit -m \"update docs\"\n  git pushup -I '*.md' -I 'bots/'")]
pub struct Cli {
    /// Ignore files matching this pattern. Can be repeated. Patterns follow
    /// the .gitignore syntax and semantics (see man gitignore).
    #[arg(short = 'I', long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// How many times the push should be attempted [default: 10]
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: Option<u32>,

    /// Pull with a merge instead of `--rebase`.
    #[arg(long)]
    pub no_rebase: bool,

    /// Path to the repository's git dir (absolute, or relative to the
    /// current directory).
    #[arg(long, env = "GIT_DIR", value_name = "PATH")]
    pub git_dir: Option<PathBuf>,

    /// Verbose logs, including git's own output for push and pull.
    #[arg(short, long)]
    pub verbose: bool,

    /// Never push: pull and check the rules once, then exit.
    #[arg(short = 'N', long)]
    pub dry_run: bool,

    /// Print the outcome as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Print shell completions and exit. Other options are ignored.
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}
