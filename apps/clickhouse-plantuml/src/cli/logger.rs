//! # Logger Module
//!
//! Sets up `tracing-subscriber` with an `EnvFilter`, so `RUST_LOG` works as
//! usual, writing to stderr in text or JSON format.
//!
//! The level comes from the `-v` flags when given, then from
//! `logger.level` in the settings, and defaults to errors only:
//!
//! | flags  | level |
//! |--------|-------|
//! | none   | ERROR |
//! | `-v`   | WARN  |
//! | `-vv`  | INFO  |
//! | `-vvv` | DEBUG |
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Standard Rust log filtering (e.g., `RUST_LOG=clickhouse_plantuml::framework=debug`)
//! - `CH_PLANTUML__LOGGER__LEVEL`: Log level (DEBUG, INFO, WARN, ERROR)
//! - `CH_PLANTUML__LOGGER__FORMAT`: Text or Json (default: Text)

use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum LoggerLevel {
    #[serde(alias = "DEBUG", alias = "debug")]
    Debug,
    #[serde(alias = "INFO", alias = "info")]
    Info,
    #[serde(alias = "WARN", alias = "warn")]
    Warn,
    #[serde(alias = "ERROR", alias = "error")]
    Error,
}

impl LoggerLevel {
    pub fn to_tracing_level(&self) -> LevelFilter {
        match self {
            LoggerLevel::Debug => LevelFilter::DEBUG,
            LoggerLevel::Info => LevelFilter::INFO,
            LoggerLevel::Warn => LevelFilter::WARN,
            LoggerLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[serde(alias = "json", alias = "JSON")]
    Json,
    #[default]
    #[serde(alias = "text", alias = "TEXT")]
    Text,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggerSettings {
    #[serde(default)]
    pub level: Option<LoggerLevel>,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Failed to install the log subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Level for a number of `-v` flags
pub fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

pub fn effective_level(settings: &LoggerSettings, verbose: u8) -> LevelFilter {
    match (&settings.level, verbose) {
        (Some(level), 0) => level.to_tracing_level(),
        _ => verbosity_level(verbose),
    }
}

pub fn setup_logging(settings: &LoggerSettings, verbose: u8) -> Result<(), LoggerError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(effective_level(settings, verbose).into())
        .from_env_lossy();

    let format_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    if settings.format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(format_layer.json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(format_layer.compact())
            .try_init()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_level() {
        assert_eq!(verbosity_level(0), LevelFilter::ERROR);
        assert_eq!(verbosity_level(1), LevelFilter::WARN);
        assert_eq!(verbosity_level(2), LevelFilter::INFO);
        assert_eq!(verbosity_level(3), LevelFilter::DEBUG);
        assert_eq!(verbosity_level(10), LevelFilter::DEBUG);
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = LoggerSettings {
            level: Some(LoggerLevel::Info),
            format: LogFormat::Text,
        };
        assert_eq!(effective_level(&settings, 0), LevelFilter::INFO);
        assert_eq!(effective_level(&settings, 3), LevelFilter::DEBUG);
        assert_eq!(
            effective_level(&LoggerSettings::default(), 0),
            LevelFilter::ERROR
        );
    }

    #[test]
    fn test_logger_settings_deserialize() {
        let settings: LoggerSettings =
            serde_json::from_str(r#"{"level": "debug", "format": "Json"}"#).unwrap();
        assert_eq!(settings.level, Some(LoggerLevel::Debug));
        assert_eq!(settings.format, LogFormat::Json);

        let settings: LoggerSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, LoggerSettings::default());
    }
}
