//! Settings read from `clickhouse-plantuml.toml` in the working directory and
//! `CH_PLANTUML__*` environment variables, e.g.
//!
//! ```toml
//! [clickhouse]
//! host = "ch.internal"
//! host_port = 8443
//! use_ssl = true
//!
//! [logger]
//! level = "INFO"
//! ```
//!
//! is the same as `CH_PLANTUML__CLICKHOUSE__HOST=ch.internal` and so on.
//! Command line flags take precedence over both.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::logger::LoggerSettings;
use crate::infrastructure::olap::clickhouse::config::ClickHouseConfig;

pub const SETTINGS_FILE: &str = "clickhouse-plantuml";
pub const ENVIRONMENT_PREFIX: &str = "CH_PLANTUML";

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub clickhouse: ClickHouseConfig,
    #[serde(default)]
    pub logger: LoggerSettings,
}

fn environment() -> Environment {
    Environment::with_prefix(ENVIRONMENT_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

pub fn read_settings() -> Result<Settings, ConfigError> {
    Config::builder()
        .add_source(File::with_name(SETTINGS_FILE).required(false))
        .add_source(environment())
        .build()?
        .try_deserialize()
}
