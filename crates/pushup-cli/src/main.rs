//! git-pushup - push, and when the remote has moved, pull and retry as long
//! as the pulled changes only touch files you said are safe to merge.
//!
//! Installed on `PATH`, it also runs as `git pushup`.

use clap::Parser;
use pushup_core::Error as CoreError;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::Cli;

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        commands::completions::run(shell);
        return;
    }

    init_logging(cli.verbose);
    output::set_quiet(cli.json);

    if let Err(e) = commands::pushup::run(&cli) {
        output::error(&format!("{e:#}"));
        if is_configuration(&e) {
            output::warn("Check -I/--ignore, -r/--retries, or the [sync] table in pushup.toml");
        }
        std::process::exit(exit_code(&e));
    }
}

/// Whether the run failed on its settings before touching the repository.
fn is_configuration(err: &anyhow::Error) -> bool {
    err.downcast_ref::<CoreError>()
        .is_some_and(CoreError::is_configuration)
}

/// Log to stderr at `info`, or `debug` with `--verbose`. `RUST_LOG` wins.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// 2 for an unsafe change, 3 for a lost push race, 1 for anything else.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CoreError>() {
        Some(CoreError::RuleViolation { .. }) => 2,
        Some(CoreError::RetriesExhausted { .. }) => 3,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let conflict = anyhow::Error::from(CoreError::RuleViolation {
            path: "src/lib.rs".into(),
            patterns: vec!["*.md".into()],
        });
        assert_eq!(exit_code(&conflict), 2);

        let exhausted = anyhow::Error::from(CoreError::RetriesExhausted { attempts: 10 });
        assert_eq!(exit_code(&exhausted), 3);

        let config = anyhow::Error::from(CoreError::NoIgnorePatterns);
        assert_eq!(exit_code(&config), 1);

        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }

    #[test]
    fn test_configuration_errors_are_recognized() {
        assert!(is_configuration(&anyhow::Error::from(
            CoreError::NoIgnorePatterns
        )));
        assert!(!is_configuration(&anyhow::Error::from(
            CoreError::RetriesExhausted { attempts: 1 }
        )));
        assert!(!is_configuration(&anyhow::anyhow!("boom")));
    }
}
