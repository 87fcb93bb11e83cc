//! Process configuration read from the environment

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "warn,agent_finance=info,agent_runtime=info";

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for terminals
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Error)]
#[error("Unknown log format '{0}' (expected 'pretty' or 'json')")]
pub struct ParseLogFormatError(String);

impl FromStr for LogFormat {
    type Err = ParseLogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ParseLogFormatError(other.to_string())),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (development, production, ...)
    pub environment: String,
    /// `EnvFilter` directives
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "finance-supervisor".to_string(),
            environment: "development".to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }

    /// Read `APP_ENV`, `RUST_LOG` and `LOG_FORMAT`
    ///
    /// An unrecognized `LOG_FORMAT` falls back to pretty output.
    pub fn from_env(app_name: impl Into<String>) -> Self {
        Self::from_lookup(app_name, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source
    pub fn from_lookup<F>(app_name: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(app_name);
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(env) = non_empty("APP_ENV") {
            config.environment = env;
        }
        if let Some(filter) = non_empty("RUST_LOG") {
            config.log_filter = filter;
        }
        if let Some(format) = non_empty("LOG_FORMAT") {
            config.log_format = format.parse().unwrap_or_default();
        }
        config
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// Load a `.env` file from the current directory or its parents
///
/// Returns the path that was loaded, if any. Variables already set in the
/// process environment win.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = Config::from_lookup("app", lookup(&[]));
        assert_eq!(config.app_name, "app");
        assert_eq!(config.environment, "development");
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_reads_variables() {
        let config = Config::from_lookup(
            "app",
            lookup(&[
                ("APP_ENV", "production"),
                ("RUST_LOG", "debug"),
                ("LOG_FORMAT", "JSON"),
            ]),
        );
        assert!(config.is_production());
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_bad_log_format_falls_back() {
        let config = Config::from_lookup("app", lookup(&[("LOG_FORMAT", "xml"), ("RUST_LOG", " ")]));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
