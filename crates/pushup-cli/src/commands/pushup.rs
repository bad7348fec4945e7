//! The pushup run: build options, run the sync loop, report the outcome.

use anyhow::{Context, Result};
use pushup_core::{Config, SyncConfig, SyncLoop, SyncOptions, SyncOutcome};
use pushup_git::{Repository, Verbosity};
use tracing::debug;

use super::Cli;
use crate::output;

/// Run git-pushup with the parsed command line.
pub fn run(cli: &Cli) -> Result<()> {
    let repo = Repository::discover(cli.git_dir.clone()).context("Not inside a git repository")?;

    let config_path = Config::path_in(&repo.absolute_git_dir()?);
    debug!(path = %config_path.display(), exists = config_path.exists(), "config file");
    let config = Config::load(&config_path)?;

    let options = sync_options(cli, &config.sync);
    let sync = SyncLoop::new(&repo, &repo, options)?;
    debug!(patterns = ?sync.policy().patterns(), "ignore patterns");
    let outcome = sync.run()?;

    report(&outcome, cli.json)
}

/// Fold flags over the config file: anything given on the command line wins.
fn sync_options(cli: &Cli, config: &SyncConfig) -> SyncOptions {
    let verbosity = if cli.verbose {
        Verbosity::Forward
    } else {
        Verbosity::Quiet
    };
    let mut options = SyncOptions::from_config(config)
        .with_dry_run(cli.dry_run)
        .with_routine_verbosity(verbosity);

    if !cli.ignore.is_empty() {
        options = options.with_ignore(cli.ignore.clone());
    }
    if let Some(retries) = cli.retries {
        options = options.with_retries(retries);
    }
    if cli.no_rebase {
        options = options.with_rebase(false);
    }
    options
}

fn report(outcome: &SyncOutcome, json: bool) -> Result<()> {
    if json {
        output::essential(&serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    match outcome {
        SyncOutcome::Pushed { attempts: 1, .. } => output::success("Pushed"),
        SyncOutcome::Pushed { attempts, pulls } => {
            output::success(&format!(
                "Pushed on attempt {attempts} after {} safe pull(s)",
                pulls.len()
            ));
        }
        SyncOutcome::DryRun { check } => {
            output::warn("Dry run - nothing was pushed");
            if check.range.is_empty() {
                output::info("Nothing new upstream");
            } else {
                output::info(&format!(
                    "{} changed path(s) in {} match the ignore patterns:",
                    check.changed_paths.len(),
                    check.range
                ));
                for path in &check.changed_paths {
                    output::detail(&format!("  → {path}"));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("git-pushup").chain(args.iter().copied())).unwrap()
    }

    fn file_config() -> SyncConfig {
        SyncConfig {
            ignore: vec!["docs/".into()],
            retries: 4,
            rebase: true,
        }
    }

    #[test]
    fn test_config_file_fills_gaps() {
        let options = sync_options(&parse(&[]), &file_config());
        assert_eq!(options.ignore, vec!["docs/"]);
        assert_eq!(options.retries, 4);
        assert!(options.rebase);
        assert_eq!(options.routine_verbosity, Verbosity::Quiet);
    }

    #[test]
    fn test_flags_override_config_file() {
        let cli = parse(&["-I", "*.md", "-r", "2", "--no-rebase", "-N", "-v"]);
        let options = sync_options(&cli, &file_config());
        assert_eq!(options.ignore, vec!["*.md"]);
        assert_eq!(options.retries, 2);
        assert!(!options.rebase);
        assert!(options.dry_run);
        assert_eq!(options.routine_verbosity, Verbosity::Forward);
    }

    #[test]
    fn test_defaults_without_config_file() {
        let options = sync_options(&parse(&["-I", "*.md"]), &SyncConfig::default());
        assert_eq!(options.retries, 10);
        assert!(options.rebase);
        assert!(!options.dry_run);
    }
}
