//! Tracing subscriber setup.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

/// Default filter directive for the given verbosity flags.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flags.
///
/// Returns `Err(1)` if the log file cannot be created.
pub fn init(args: &GlobalArgs) -> Result<(), i32> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(args.verbose, args.quiet)));

    match args.log_file.as_deref() {
        Some(path) => {
            let file = create_log_file(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

fn create_log_file(path: &Path) -> Result<File, i32> {
    File::create(path).map_err(|e| {
        eprintln!("Error: cannot create log file {}: {e}", path.display());
        crate::exit_codes::ERROR_GENERAL
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_directives() {
        assert_eq!(default_directive(0, false), "warn");
        assert_eq!(default_directive(1, false), "debug");
        assert_eq!(default_directive(3, false), "trace");
        assert_eq!(default_directive(0, true), "error");
    }
}
