//! Tracing setup.
//!
//! The terminal belongs to the UI while the app runs, so log lines go to a
//! file in the state directory instead of stderr.

use crate::config::{Config, DEFAULT_LOG_FILTER};
use anyhow::Context as _;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "fort-flora.log";

/// Install the global subscriber. Returns the log file path.
pub fn init(config: &Config) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(&config.state_dir)
        .with_context(|| format!("creating state directory {}", config.state_dir.display()))?;
    let path = config.state_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(&config.log_filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))?;

    Ok(path)
}

/// Parse a filter directive, falling back to the default on garbage.
fn filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_accepts_default_directives() {
        let rendered = filter(DEFAULT_LOG_FILTER).to_string();
        assert!(rendered.contains("fort_flora=info"));
    }

    #[test]
    fn test_invalid_filter_falls_back() {
        let rendered = filter("fort_flora=loud").to_string();
        assert!(rendered.contains("fort_nexus=info"));
    }
}
