//! # Clickhouse Config
//! Connection settings for the server whose catalog is read.
//!
//! Catalog queries go through the HTTP interface, so a native protocol URL
//! (`clickhouse://host:9000`) is mapped to the matching HTTP port.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_DATABASE_NAME: &str = "default";

const HTTP_PORT: u16 = 8123;
const HTTPS_PORT: u16 = 8443;
const NATIVE_PORT: u16 = 9000;
const NATIVE_SECURE_PORT: u16 = 9440;

fn default_host() -> String {
    "localhost".to_string()
}

fn default_http_port() -> u16 {
    HTTP_PORT
}

fn default_user() -> String {
    "default".to_string()
}

fn default_db_name() -> String {
    DEFAULT_DATABASE_NAME.to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClickHouseConfig {
    #[serde(default = "default_db_name")]
    pub db_name: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default = "default_host")]
    pub host: String,
    /// HTTP interface port
    #[serde(default = "default_http_port")]
    pub host_port: u16,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            db_name: default_db_name(),
            user: default_user(),
            password: String::new(),
            use_ssl: false,
            host: default_host(),
            host_port: default_http_port(),
        }
    }
}

impl ClickHouseConfig {
    /// Returns a display-safe connection URL with the password masked.
    pub fn display_url(&self) -> String {
        let protocol = if self.use_ssl { "https" } else { "http" };
        if self.password.is_empty() {
            format!(
                "{}://{}@{}:{}/?database={}",
                protocol, self.user, self.host, self.host_port, self.db_name
            )
        } else {
            format!(
                "{}://{}:******@{}:{}/?database={}",
                protocol, self.user, self.host, self.host_port, self.db_name
            )
        }
    }

    pub fn url(&self) -> String {
        let protocol = if self.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", protocol, self.host, self.host_port)
    }
}

/// Parses a ClickHouse connection string (URL) into a ClickHouseConfig
///
/// Accepts `http`, `https` and `clickhouse` schemes. The database comes from
/// the path or the `database` query parameter, the user from the URL or the
/// `user` query parameter. Username and password are percent-decoded.
pub fn parse_clickhouse_connection_string(conn_str: &str) -> anyhow::Result<ClickHouseConfig> {
    let url = Url::parse(conn_str)?;

    let user = percent_encoding::percent_decode_str(url.username())
        .decode_utf8_lossy()
        .to_string();
    let password = url
        .password()
        .map(|p| {
            percent_encoding::percent_decode_str(p)
                .decode_utf8_lossy()
                .to_string()
        })
        .unwrap_or_default();
    let host = url.host_str().unwrap_or("localhost").to_string();

    let (use_ssl, host_port) = match url.scheme() {
        "https" => (true, url.port().unwrap_or(443)),
        "http" => (false, url.port().unwrap_or(80)),
        "clickhouse" => {
            let native_port = url.port().unwrap_or(NATIVE_PORT);
            let use_ssl = native_port == NATIVE_SECURE_PORT;
            let http_port = if use_ssl { HTTPS_PORT } else { HTTP_PORT };
            warn!(
                "Native protocol port {} is read through the HTTP port {}",
                native_port, http_port
            );
            (use_ssl, http_port)
        }
        other => anyhow::bail!("Unsupported connection string scheme '{}'", other),
    };

    let user = if user.is_empty() {
        url.query_pairs()
            .find(|(key, _)| key == "user")
            .map(|(_, v)| v.to_string())
            .unwrap_or_else(default_user)
    } else {
        user
    };

    let db_name = if !url.path().is_empty() && url.path() != "/" && url.path() != "//" {
        url.path().trim_start_matches('/').to_string()
    } else {
        url.query_pairs()
            .find(|(k, _)| k == "database")
            .map(|(_, v)| v.to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(default_db_name)
    };

    Ok(ClickHouseConfig {
        db_name,
        user,
        password,
        use_ssl,
        host,
        host_port,
    })
}
