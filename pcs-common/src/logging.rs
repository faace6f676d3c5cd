//! Tracing subscriber setup shared by all PCS binaries
//!
//! Filter priority: `RUST_LOG` → `--log-level` → `[logging] level` → "info".
//! Output goes to stderr (or the configured log file); stdout is left for
//! run summaries.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Pick the filter directive from CLI and config
pub fn filter_directive<'a>(cli_level: Option<&'a str>, config: &'a LoggingConfig) -> &'a str {
    cli_level
        .filter(|level| !level.is_empty())
        .unwrap_or(config.level.as_str())
}

/// Install the global subscriber
pub fn init(cli_level: Option<&str>, config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = filter_directive(cli_level, config);
            EnvFilter::try_new(directive).map_err(|e| {
                Error::Config(format!("Invalid log level '{}': {}", directive, e))
            })?
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_level_overrides_config() {
        let config = LoggingConfig::default();
        assert_eq!(filter_directive(Some("debug"), &config), "debug");
        assert_eq!(filter_directive(None, &config), "info");
        assert_eq!(filter_directive(Some(""), &config), "info");
    }
}
