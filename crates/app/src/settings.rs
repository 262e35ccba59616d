//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and overridden by `LEDGERBOOK__*` environment
//! variables (e.g. `LEDGERBOOK__SERVER__PORT=8080`).
//!
//! See `settings.example.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

/// Payment modes and export currency label. Missing values fall back to the
/// engine defaults.
#[derive(Debug, Default, Deserialize)]
pub struct Ledger {
    pub income_modes: Option<Vec<String>>,
    pub expense_modes: Option<Vec<String>>,
    pub currency_label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub ledger: Ledger,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("LEDGERBOOK")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("ledger.income_modes")
                    .with_list_parse_key("ledger.expense_modes")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
