//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub feeds: FeedsConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub charts: ChartConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Table store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("covid.db")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Remote feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedsConfig {
    #[serde(default = "default_states_url")]
    pub states_url: String,

    #[serde(default = "default_world_url")]
    pub world_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_states_url() -> String {
    "https://covidtracking.com/api/v1/states/daily.csv".to_string()
}

fn default_world_url() -> String {
    "https://covid.ourworldindata.org/data/owid-covid-data.csv".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            states_url: default_states_url(),
            world_url: default_world_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Dashboard server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub debug: bool,

    /// States pre-selected in the state dropdown
    #[serde(default = "default_states")]
    pub default_states: Vec<String>,

    /// Countries pre-selected in the country dropdown
    #[serde(default = "default_countries")]
    pub default_countries: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8051
}

fn default_states() -> Vec<String> {
    ["OH", "MA", "NH", "TX"].iter().map(|s| s.to_string()).collect()
}

fn default_countries() -> Vec<String> {
    ["United States", "Hungary"].iter().map(|s| s.to_string()).collect()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
            default_states: default_states(),
            default_countries: default_countries(),
        }
    }
}

impl DashboardConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Chart styling shared by every figure
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartConfig {
    /// Series colors, cycled by position in the selection
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,

    /// First date on every x-axis
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,

    #[serde(default = "default_dark")]
    pub dark: bool,

    /// Height of the positivity reference line
    #[serde(default = "default_target_ratio")]
    pub target_ratio: f64,

    /// Where the positivity reference line stops
    #[serde(default = "default_target_line_end")]
    pub target_line_end: NaiveDate,

    /// Where the reference line label sits
    #[serde(default = "default_target_label_date")]
    pub target_label_date: NaiveDate,

    #[serde(default = "default_target_label")]
    pub target_label: String,
}

fn default_palette() -> Vec<String> {
    ["#EA62E3", "#FFB28F", "#B6C4E7", "#32DC62", "#FFF400", "#FFA8C5"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn default_epoch() -> NaiveDate {
    ymd(2020, 2, 1)
}

fn default_dark() -> bool {
    true
}

fn default_target_ratio() -> f64 {
    0.1
}

fn default_target_line_end() -> NaiveDate {
    ymd(2020, 8, 5)
}

fn default_target_label_date() -> NaiveDate {
    ymd(2020, 2, 10)
}

fn default_target_label() -> String {
    "WHO Goal".to_string()
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            epoch: default_epoch(),
            dark: default_dark(),
            target_ratio: default_target_ratio(),
            target_line_end: default_target_line_end(),
            target_label_date: default_target_label_date(),
            target_label: default_target_label(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("covid-dash").join("config.toml")),
            Some(PathBuf::from("/etc/covid-dash/config.toml")),
            Some(PathBuf::from("./covid-dash.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("COVID_DASH_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }

        if let Some(url) = lookup("COVID_DASH_STATES_URL") {
            self.feeds.states_url = url;
        }
        if let Some(url) = lookup("COVID_DASH_WORLD_URL") {
            self.feeds.world_url = url;
        }

        if let Some(host) = lookup("COVID_DASH_HOST") {
            self.dashboard.host = host;
        }
        if let Some(port) = lookup("COVID_DASH_PORT") {
            if let Ok(p) = port.parse() {
                self.dashboard.port = p;
            }
        }

        if let Some(level) = lookup("COVID_DASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("COVID_DASH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r##"# covid-dash Configuration
#
# Environment variables override these settings:
# - COVID_DASH_STORE_PATH
# - COVID_DASH_STATES_URL
# - COVID_DASH_WORLD_URL
# - COVID_DASH_HOST
# - COVID_DASH_PORT
# - COVID_DASH_LOG_LEVEL
# - COVID_DASH_LOG_FORMAT

[store]
# SQLite file holding covid_states and covid_world
path = "covid.db"

[feeds]
# Daily per-state testing data
states_url = "https://covidtracking.com/api/v1/states/daily.csv"

# Daily per-country case data
world_url = "https://covid.ourworldindata.org/data/owid-covid-data.csv"

# Download timeout in seconds
request_timeout_secs = 60

[dashboard]
host = "0.0.0.0"
port = 8051
debug = false

# Initial dropdown selections
default_states = ["OH", "MA", "NH", "TX"]
default_countries = ["United States", "Hungary"]

[charts]
# Series colors, assigned by position in the selection
palette = ["#EA62E3", "#FFB28F", "#B6C4E7", "#32DC62", "#FFF400", "#FFA8C5"]

# First date on every x-axis
epoch = "2020-02-01"

# Dark template with transparent background
dark = true

# Positivity reference line
target_ratio = 0.1
target_line_end = "2020-08-05"
target_label_date = "2020-02-10"
target_label = "WHO Goal"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"##
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.path, PathBuf::from("covid.db"));
        assert_eq!(config.dashboard.addr(), "0.0.0.0:8051");
        assert!(!config.dashboard.debug);
        assert_eq!(config.dashboard.default_states, vec!["OH", "MA", "NH", "TX"]);
        assert_eq!(config.charts.palette.len(), 6);
        assert_eq!(config.charts.epoch, NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let parsed = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.feeds.states_url, defaults.feeds.states_url);
        assert_eq!(parsed.dashboard.default_countries, defaults.dashboard.default_countries);
        assert_eq!(parsed.charts, defaults.charts);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed = Config::parse("[dashboard]\nport = 9000\n").unwrap();
        assert_eq!(parsed.dashboard.port, 9000);
        assert_eq!(parsed.dashboard.host, "0.0.0.0");
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("COVID_DASH_STORE_PATH", "/tmp/other.db"),
            ("COVID_DASH_PORT", "not-a-port"),
            ("COVID_DASH_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.store.path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.dashboard.port, 8051);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/covid-dash.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
