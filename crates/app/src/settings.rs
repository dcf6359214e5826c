//! Handles settings for the application. Configuration is written in
//! `config/settings.toml` and can be overridden with `SPENDBOT__*`
//! environment variables (e.g. `SPENDBOT__TELEGRAM__TOKEN`).

use config::{Config, ConfigError, Environment, File};
use conversation::ConversationSettings;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
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
pub struct Telegram {
    pub token: String,
    #[serde(default)]
    pub allowed_users: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub telegram: Telegram,
    #[serde(default)]
    pub conversation: ConversationSettings,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("SPENDBOT").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
