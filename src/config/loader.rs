//! Configuration loading from disk.
//!
//! # Responsibilities
//! - Read and deserialize a TOML config file
//! - Run semantic validation before the config reaches the engine
//!
//! # Design Decisions
//! - A validation failure reports every offending field in one error

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::EngineConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error produced while loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Load a TOML config file and validate it.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: EngineConfig = toml::from_str(&content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_config() {
        let config: EngineConfig = toml::from_str(
            r#"
            [monitor]
            tick_interval_ms = 250

            [resources]
            cpu_threshold_pct = 80.0
            "#,
        )
        .unwrap();

        assert_eq!(config.monitor.tick_interval_ms, 250);
        assert_eq!(config.resources.cpu_threshold_pct, 80.0);
        // Untouched sections keep their defaults.
        assert_eq!(config.failover.fail_max, 5);
    }

    #[test]
    fn validation_failure_names_every_offending_field() {
        let config: EngineConfig = toml::from_str(
            r#"
            [monitor]
            tick_interval_ms = 0

            [resources]
            disk_threshold_pct = 150.0
            "#,
        )
        .unwrap();

        let err = ConfigError::Validation(validate_config(&config).unwrap_err());
        let message = err.to_string();
        assert!(message.contains("monitor.tick_interval_ms"));
        assert!(message.contains("resources.disk_threshold_pct"));
    }
}
