use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `CREATIVE_INSIGHTS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    /// Raw key/value settings handed to the goal resolver
    /// (`campaign_goal`, `winner_roas_threshold`, ...).
    #[serde(default)]
    pub settings: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

// Default functions
fn default_currency() -> String {
    "USD".to_string()
}
fn default_snapshot_path() -> String {
    "snapshots.json".to_string()
}
fn default_log_filter() -> String {
    "creative_insights=info,creative_reporting=info".to_string()
}
fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: default_log_format(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            currency: default_currency(),
            snapshot_path: default_snapshot_path(),
            settings: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional config file.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("CREATIVE_INSIGHTS")
                .separator("__")
                .try_parsing(false),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
