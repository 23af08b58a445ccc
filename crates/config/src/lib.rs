//! Conso Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid configuration: every section falls back to
//! the defaults documented on its struct.
//!
//! # Parsing
//!
//! ```
//! use conso_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[dashboard]\ntop_limit = 5").unwrap();
//! assert_eq!(config.dashboard.top_limit, 5);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [log]
//! level = "debug"
//!
//! [sources]
//! data_dir = "/srv/dashboard-data"
//! events = "consumption_histories_*.csv"
//!
//! [dashboard]
//! default_window_days = 31
//! empty_selection = "match_all"
//! ```

mod dashboard;
mod error;
mod logging;
mod sources;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use dashboard::{DashboardConfig, EmptySelectionPolicy, GranularitySetting};
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use sources::SourcesConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Locations of the event log and reference tables
    pub sources: SourcesConfig,

    /// Query defaults used by the presentation shell
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML,
    /// or fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        validation::validate_config(&config)?;
        Ok(config)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.log.level, LogLevel::Info);
        assert_eq!(config.dashboard.default_window_days, 31);
        assert_eq!(config.dashboard.top_limit, 10);
        assert_eq!(config.sources.organizations, "organizations.csv");
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[log]
level = "debug"
format = "json"

[sources]
data_dir = "/srv/data"
events = "consumption_histories_prod.csv"
organizations = "organizations_prod.csv"

[dashboard]
default_window_days = 90
top_limit = 5
empty_selection = "match_none"
granularity = "month"
"#;
        let config = Config::from_str(toml).unwrap();

        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.sources.data_dir.to_str(), Some("/srv/data"));
        assert_eq!(config.sources.events, "consumption_histories_prod.csv");
        assert_eq!(config.sources.organizations, "organizations_prod.csv");
        // untouched tables keep their default file names
        assert_eq!(config.sources.users, "users.csv");
        assert_eq!(config.dashboard.default_window_days, 90);
        assert_eq!(config.dashboard.top_limit, 5);
        assert_eq!(
            config.dashboard.empty_selection,
            EmptySelectionPolicy::MatchNone
        );
        assert_eq!(config.dashboard.granularity, GranularitySetting::Month);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_str("invalid { toml").is_err());
    }

    #[test]
    fn test_validation_runs_on_parse() {
        let result = Config::from_str("[dashboard]\ntop_limit = 0");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file("/nonexistent/conso.toml");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
