//! Dashboard query defaults

use serde::Deserialize;

/// How an empty multi-select (types, organizations, users) is interpreted
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmptySelectionPolicy {
    /// Nothing selected means no restriction (default)
    #[default]
    MatchAll,
    /// Nothing selected means nothing matches
    MatchNone,
}

/// Default time bucket unit
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GranularitySetting {
    /// One bucket per calendar day (default)
    #[default]
    Day,
    /// One bucket per calendar month
    Month,
}

/// Dashboard configuration
///
/// ```toml
/// [dashboard]
/// default_window_days = 31
/// top_limit = 10
/// empty_selection = "match_all"
/// granularity = "day"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Width of the default date window, ending on the latest event.
    /// Default: 31
    pub default_window_days: u32,

    /// Number of rows in leaderboards. Default: 10
    pub top_limit: usize,

    /// Empty multi-select policy. Default: match_all
    pub empty_selection: EmptySelectionPolicy,

    /// Default bucket unit for volume reports. Default: day
    pub granularity: GranularitySetting,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_window_days: 31,
            top_limit: 10,
            empty_selection: EmptySelectionPolicy::MatchAll,
            granularity: GranularitySetting::Day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.default_window_days, 31);
        assert_eq!(config.top_limit, 10);
        assert_eq!(config.empty_selection, EmptySelectionPolicy::MatchAll);
        assert_eq!(config.granularity, GranularitySetting::Day);
    }

    #[test]
    fn test_deserialize_policy() {
        let config: DashboardConfig = toml::from_str("empty_selection = \"match_none\"").unwrap();
        assert_eq!(config.empty_selection, EmptySelectionPolicy::MatchNone);
        assert!(toml::from_str::<DashboardConfig>("empty_selection = \"sometimes\"").is_err());
    }
}
