//! CLI configuration from the environment.
//!
//! Every setting has a default, so an empty environment is valid.
//! Command-line flags override what is read here.

use std::path::PathBuf;

use tic_rules::ExpiryThresholds;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_format: LogFormat,
    /// Expiring-soon window in days.
    pub expiry_window_days: i64,
    /// Warning (renewal reminder) window in days.
    pub warning_window_days: i64,
    /// Dataset used when `--dataset` is not given.
    pub dataset: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            expiry_window_days: 30,
            warning_window_days: 60,
            dataset: None,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TIC_LOG_LEVEL` (default: `info`)
    /// - `TIC_LOG_FORMAT` (`compact` or `json`, default: `compact`)
    /// - `TIC_EXPIRY_WINDOW_DAYS` (default: 30)
    /// - `TIC_WARNING_WINDOW_DAYS` (default: 60)
    /// - `TIC_DATASET` (no default)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`CliConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let log_format = match lookup("TIC_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("compact") => LogFormat::Compact,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        };
        let config = Self {
            log_level: lookup("TIC_LOG_LEVEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_level),
            log_format,
            expiry_window_days: env_days(&lookup, "TIC_EXPIRY_WINDOW_DAYS", defaults.expiry_window_days)?,
            warning_window_days: env_days(&lookup, "TIC_WARNING_WINDOW_DAYS", defaults.warning_window_days)?,
            dataset: lookup("TIC_DATASET")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        };
        config.thresholds()?;
        Ok(config)
    }

    /// Expiry thresholds built from the two windows.
    pub fn thresholds(&self) -> Result<ExpiryThresholds, ConfigError> {
        ExpiryThresholds::new(self.expiry_window_days, self.warning_window_days)
            .map_err(|e| ConfigError::InvalidWindows(e.to_string()))
    }
}

fn env_days(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: i64,
) -> Result<i64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            var,
            value: raw.clone(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of days, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("TIC_LOG_FORMAT must be \"compact\" or \"json\", got {0:?}")]
    InvalidLogFormat(String),
    #[error("invalid expiry windows: {0}")]
    InvalidWindows(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_from_empty_environment() {
        let config = CliConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.thresholds().unwrap(), ExpiryThresholds::default());
    }

    #[test]
    fn test_overrides() {
        let config = CliConfig::from_lookup(lookup(&[
            ("TIC_LOG_LEVEL", "debug"),
            ("TIC_LOG_FORMAT", "json"),
            ("TIC_EXPIRY_WINDOW_DAYS", " 14 "),
            ("TIC_WARNING_WINDOW_DAYS", "45"),
            ("TIC_DATASET", "/srv/tic/dataset.yaml"),
        ]))
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.expiry_window_days, 14);
        assert_eq!(config.warning_window_days, 45);
        assert_eq!(config.dataset, Some(PathBuf::from("/srv/tic/dataset.yaml")));
    }

    #[test]
    fn test_invalid_values() {
        let err = CliConfig::from_lookup(lookup(&[("TIC_EXPIRY_WINDOW_DAYS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { var: "TIC_EXPIRY_WINDOW_DAYS", .. }));

        let err = CliConfig::from_lookup(lookup(&[("TIC_LOG_FORMAT", "pretty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogFormat(_)));

        let err = CliConfig::from_lookup(lookup(&[
            ("TIC_EXPIRY_WINDOW_DAYS", "90"),
            ("TIC_WARNING_WINDOW_DAYS", "60"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWindows(_)));
    }
}
