//! Tracing subscriber setup.
//!
//! The TUI owns the terminal, so it logs to a file. Every other command logs
//! to stderr, which keeps stdout clean for reports.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Environment variable holding the filter directive (e.g. `salesdash=debug`).
pub const LOG_ENV: &str = "SALESDASH_LOG";

const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// The filter from `SALESDASH_LOG`, or `warn` when it is unset or invalid.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
pub fn init(target: &LogTarget) -> Result<(), AppError> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter()).with_target(true);

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = File::create(path).map_err(|e| {
                AppError::input(format!("Failed to create log file '{}': {e}", path.display()))
            })?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).try_init()
        }
    };

    installed.map_err(|e| AppError::runtime(format!("Failed to install logger: {e}")))
}
