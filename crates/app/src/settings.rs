//! Runtime configuration, read from `settings.toml` plus `ASSISTA__*`
//! environment overrides.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub mail: Option<Mail>,
    pub sms: Option<Sms>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    /// Public portal base URL used in notification deep links.
    pub base_url: String,
}

/// `"memory"` or a path to the sqlite file.
#[derive(Debug, Clone)]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl<'de> Deserialize<'de> for Database {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "memory" => Database::Memory,
            path => Database::Sqlite(path.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Mail {
    pub base_url: String,
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Deserialize)]
pub struct Sms {
    pub base_url: String,
    pub device_id: String,
    pub api_key: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .add_source(Environment::with_prefix("ASSISTA").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
