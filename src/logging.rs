//! Structured logging to a file.
//!
//! The terminal is in raw mode while the demo runs, so events go to a log
//! file instead of stdout. Filter priority: `RETROMENU_LOG` > config > "info".

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

pub const LOG_ENV: &str = "RETROMENU_LOG";

/// Install the global subscriber. Fails if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)?;

    let result = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_env_filter(build_env_filter(&config.filter))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .try_init();

    // A subscriber installed earlier (tests, embedding) is not an error here
    if let Err(e) = result {
        eprintln!("Warning: logging already initialized: {e}");
    }
    Ok(())
}

fn build_env_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_configured_filter_falls_back() {
        // Whatever RETROMENU_LOG holds, building a filter never panics
        let filter = build_env_filter("[[[not a filter");
        assert!(!filter.to_string().is_empty());
    }
}
