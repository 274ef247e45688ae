//! Tracing setup for the CLI.
//!
//! Log lines go to stderr so command output on stdout stays parseable.
//! The filter is chosen in this order: `--debug`, `RUST_LOG`, then the
//! `[logging] level` setting.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{LogFormat, LoggingSettings};

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to parse log filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Picks the filter directive to use.
fn filter_directive(debug: bool, env: Option<String>, configured: &str) -> String {
    if debug {
        return Level::DEBUG.to_string();
    }
    env.filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| configured.to_string())
}

/// Installs the global subscriber.
pub fn init_logging(settings: &LoggingSettings, debug: bool) -> Result<(), LoggingError> {
    let directive = filter_directive(
        debug,
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        &settings.level,
    );
    let env_filter = EnvFilter::try_new(directive)?;

    match settings.format {
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(debug),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .without_time(),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_wins() {
        let directive = filter_directive(true, Some("error".into()), "warn");
        assert_eq!(directive, "DEBUG");
    }

    #[test]
    fn env_overrides_config() {
        let directive = filter_directive(false, Some("daybook_core=trace".into()), "warn");
        assert_eq!(directive, "daybook_core=trace");
    }

    #[test]
    fn blank_env_falls_back_to_config() {
        assert_eq!(filter_directive(false, Some("  ".into()), "info"), "info");
        assert_eq!(filter_directive(false, None, "info"), "info");
    }

    #[test]
    fn configured_levels_parse() {
        for level in ["warn", "debug", "daybook_core=debug,daybook_ics=info"] {
            assert!(EnvFilter::try_new(level).is_ok(), "{level}");
        }
    }
}
