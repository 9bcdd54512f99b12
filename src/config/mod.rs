//! Configuration module for the retention engine.
//!
//! The engine is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [database]
//! path = "${DATA_DIR}/reclaim.db"
//!
//! [retention]
//! enabled = true
//! window_days = 60
//! ```

mod database;
mod retention;

use std::path::Path;

pub use database::*;
pub use retention::*;
use serde::{Deserialize, Serialize};

/// Root configuration for the retention engine.
///
/// All sections are optional with sensible defaults, allowing minimal
/// configuration for simple deployments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Database configuration for persistent storage.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Retention window and sweep schedule.
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing required variables will cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;

        let config: EngineConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;
        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration for consistency and completeness.
    fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.retention.validate()?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand `${VAR_NAME}` references with values from the environment.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static pattern");
    let mut result = String::with_capacity(input.len());
    let mut last_end = 0;

    for cap in re.captures_iter(input) {
        let whole = cap.get(0).expect("capture 0 always present");
        let name = &cap[1];

        let value =
            std::env::var(name).map_err(|_| ConfigError::EnvVarNotFound(name.to_string()))?;

        result.push_str(&input[last_end..whole.start()]);
        result.push_str(&value);
        last_end = whole.end();
    }
    result.push_str(&input[last_end..]);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config.database.path, "reclaim.db");
        assert_eq!(config.retention.window_days, 60);
        assert!(!config.retention.enabled);
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            [database]
            path = "/var/lib/reclaim/data.db"
            max_connections = 10

            [retention]
            enabled = true
            window_days = 30
            sweep_hour_utc = 2
        "#;
        let config = EngineConfig::from_toml(toml).unwrap();
        assert_eq!(config.database.path, "/var/lib/reclaim/data.db");
        assert_eq!(config.database.max_connections, 10);
        assert!(config.retention.enabled);
        assert_eq!(config.retention.window_days, 30);
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: test-local variable, no concurrent reader depends on it
        unsafe { std::env::set_var("RECLAIM_TEST_DB_PATH", "/tmp/expanded.db") };

        let toml = r#"
            [database]
            path = "${RECLAIM_TEST_DB_PATH}"
        "#;
        let config = EngineConfig::from_toml(toml).unwrap();
        assert_eq!(config.database.path, "/tmp/expanded.db");
    }

    #[test]
    fn test_missing_env_var_is_an_error() {
        let toml = r#"
            [database]
            path = "${RECLAIM_TEST_DOES_NOT_EXIST}"
        "#;
        let err = EngineConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotFound(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
            [retention]
            grace_days = 60
        "#;
        assert!(EngineConfig::from_toml(toml).is_err());
    }

    #[test]
    fn test_invalid_retention_rejected() {
        let toml = r#"
            [retention]
            sweep_hour_utc = 25
        "#;
        let err = EngineConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
