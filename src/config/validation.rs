//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, thresholds within 0..=100)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: EngineConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the engine

use crate::config::schema::EngineConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An interval or timeout field is zero.
    ZeroDuration { field: &'static str },

    /// A percentage threshold is outside 0..=100.
    ThresholdOutOfRange { field: &'static str, value: f64 },

    /// The circuit breaker failure threshold is zero.
    ZeroFailMax,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::ZeroDuration { field } => {
                write!(f, "{} must be greater than zero", field)
            }
            ValidationError::ThresholdOutOfRange { field, value } => {
                write!(f, "{} must be within 0..=100, got {}", field, value)
            }
            ValidationError::ZeroFailMax => {
                write!(f, "failover.fail_max must be greater than zero")
            }
        }
    }
}

/// Validate an engine configuration, collecting every error found.
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let durations = [
        ("monitor.tick_interval_ms", config.monitor.tick_interval_ms),
        ("proactive.interval_ms", config.proactive.interval_ms),
        (
            "resources.sample_interval_ms",
            config.resources.sample_interval_ms,
        ),
        ("failover.probe_timeout_ms", config.failover.probe_timeout_ms),
        ("failover.reset_timeout_ms", config.failover.reset_timeout_ms),
    ];
    for (field, value) in durations {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }

    let thresholds = [
        (
            "resources.cpu_threshold_pct",
            config.resources.cpu_threshold_pct,
        ),
        (
            "resources.memory_threshold_pct",
            config.resources.memory_threshold_pct,
        ),
        (
            "resources.disk_threshold_pct",
            config.resources.disk_threshold_pct,
        ),
    ];
    for (field, value) in thresholds {
        if !(0.0..=100.0).contains(&value) {
            errors.push(ValidationError::ThresholdOutOfRange { field, value });
        }
    }

    if config.failover.fail_max == 0 {
        errors.push(ValidationError::ZeroFailMax);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = EngineConfig::default();
        config.monitor.tick_interval_ms = 0;
        config.resources.cpu_threshold_pct = 150.0;
        config.failover.fail_max = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroFailMax));
    }
}
