//! Configuration validation
//!
//! Checks that:
//! - every source file name is non-empty
//! - the default window and leaderboard size are positive
//! - the default window stays under a century

use crate::Config;
use crate::error::{ConfigError, Result};

/// Largest accepted `default_window_days`
const MAX_WINDOW_DAYS: u32 = 36_600;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_sources(config)?;
    validate_dashboard(config)?;
    Ok(())
}

fn validate_sources(config: &Config) -> Result<()> {
    for (key, file) in config.sources.entries() {
        if file.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "sources",
                key,
                "file name must not be empty",
            ));
        }
    }
    Ok(())
}

fn validate_dashboard(config: &Config) -> Result<()> {
    if config.dashboard.default_window_days == 0 {
        return Err(ConfigError::invalid_value(
            "dashboard",
            "default_window_days",
            "must be at least 1",
        ));
    }
    if config.dashboard.default_window_days > MAX_WINDOW_DAYS {
        return Err(ConfigError::invalid_value(
            "dashboard",
            "default_window_days",
            format!("must be at most {}", MAX_WINDOW_DAYS),
        ));
    }
    if config.dashboard.top_limit == 0 {
        return Err(ConfigError::invalid_value(
            "dashboard",
            "top_limit",
            "must be at least 1",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::{Config, ConfigError};

    #[test]
    fn test_empty_file_name_rejected() {
        let err = Config::from_str("[sources]\ncontacts = \"  \"").unwrap_err();
        assert!(err.to_string().contains("contacts"));
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = Config::from_str("[dashboard]\ndefault_window_days = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "default_window_days",
                ..
            }
        ));
    }

    #[test]
    fn test_huge_window_rejected() {
        let err = Config::from_str("[dashboard]\ndefault_window_days = 4294967295").unwrap_err();
        assert!(err.to_string().contains("at most 36600"));
        assert!(Config::from_str("[dashboard]\ndefault_window_days = 36600").is_ok());
    }

    #[test]
    fn test_defaults_pass() {
        assert!(Config::from_str("").is_ok());
    }
}
