//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Budget analytics tuning.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Thresholds and limits used by the budget overview.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalyticsConfig {
    /// Spend percentage at which a budget counts as nearing its limit.
    #[serde(default = "default_nearing_limit_percent")]
    pub nearing_limit_percent: u32,
    /// Spend percentage above which a budget counts as over budget.
    #[serde(default = "default_over_budget_percent")]
    pub over_budget_percent: u32,
    /// Relative gap (in percent) between spend ratio and time ratio before
    /// the pace is reported as faster or slower.
    #[serde(default = "default_pace_tolerance_percent")]
    pub pace_tolerance_percent: u32,
    /// Number of tags reported as top spenders.
    #[serde(default = "default_top_spenders_limit")]
    pub top_spenders_limit: usize,
    /// IANA timezone used as "local time" for period presets.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_nearing_limit_percent() -> u32 {
    80
}

fn default_over_budget_percent() -> u32 {
    100
}

fn default_pace_tolerance_percent() -> u32 {
    10
}

fn default_top_spenders_limit() -> usize {
    3
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            nearing_limit_percent: default_nearing_limit_percent(),
            over_budget_percent: default_over_budget_percent(),
            pace_tolerance_percent: default_pace_tolerance_percent(),
            top_spenders_limit: default_top_spenders_limit(),
            timezone: default_timezone(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
