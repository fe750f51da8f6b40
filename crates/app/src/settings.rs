//! Service settings.
//!
//! Read from an optional `settings.toml` in the working directory, then
//! overridden by `LEDGER__*` environment variables
//! (`LEDGER__SERVER__PORT=8080`, `LEDGER__APP__LEVEL=debug`).

use std::time::Duration;

use config::{Config, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `database = "memory"` or `database = { sqlite = "ledger.db" }`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
    pub tx_timeout_ms: u64,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            database: Database::Sqlite("ledger.db".to_string()),
            tx_timeout_ms: 5_000,
        }
    }
}

impl Server {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn tx_timeout(&self) -> Duration {
        Duration::from_millis(self.tx_timeout_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(
                    Environment::with_prefix("LEDGER")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(builder: config::ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(toml: &str) -> Settings {
        Settings::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
            .unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let settings = from_toml("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.address(), "127.0.0.1:3000");
        assert_eq!(
            settings.server.database,
            Database::Sqlite("ledger.db".to_string())
        );
        assert_eq!(settings.server.tx_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = from_toml(
            r#"
            [app]
            level = "debug"

            [server]
            port = 8080
            database = "memory"
            tx_timeout_ms = 250
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.address(), "127.0.0.1:8080");
        assert_eq!(settings.server.database, Database::Memory);
        assert_eq!(settings.server.tx_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn sqlite_path_is_read_from_table() {
        let settings = from_toml(
            r#"
            [server]
            database = { sqlite = "/var/lib/ledger.db" }
            "#,
        );
        assert_eq!(
            settings.server.database,
            Database::Sqlite("/var/lib/ledger.db".to_string())
        );
    }
}
