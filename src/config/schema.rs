//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the engine.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the resilience engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Health monitor scheduling settings.
    pub monitor: MonitorConfig,

    /// Proactive healing loop settings.
    pub proactive: ProactiveConfig,

    /// Recovery history settings.
    pub recovery: RecoveryConfig,

    /// Resource watchdog settings.
    pub resources: ResourceConfig,

    /// Endpoint failover settings.
    pub failover: FailoverConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Health monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Scheduler wakeup cadence in milliseconds. Individual checks run on
    /// their own intervals; this only bounds how often due-ness is evaluated.
    pub tick_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10_000,
        }
    }
}

impl MonitorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Proactive healing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProactiveConfig {
    /// Enable the background loop that heals Degraded components.
    pub enabled: bool,

    /// Scan cadence in milliseconds.
    pub interval_ms: u64,
}

impl Default for ProactiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 60_000,
        }
    }
}

impl ProactiveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Recovery history configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Default number of records returned by history queries.
    pub history_limit: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self { history_limit: 50 }
    }
}

/// Resource watchdog configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Sampling cadence in milliseconds.
    pub sample_interval_ms: u64,

    /// CPU utilization threshold in percent.
    pub cpu_threshold_pct: f64,

    /// Memory utilization threshold in percent.
    pub memory_threshold_pct: f64,

    /// Disk utilization threshold in percent.
    pub disk_threshold_pct: f64,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 5_000,
            cpu_threshold_pct: 90.0,
            memory_threshold_pct: 90.0,
            disk_threshold_pct: 90.0,
        }
    }
}

impl ResourceConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

/// Endpoint failover configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FailoverConfig {
    /// Connectivity probe timeout in milliseconds.
    pub probe_timeout_ms: u64,

    /// Consecutive probe failures before a group's circuit opens.
    pub fail_max: u32,

    /// Cooldown in milliseconds before an open circuit allows a trial probe.
    pub reset_timeout_ms: u64,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 5_000,
            fail_max: 5,
            reset_timeout_ms: 60_000,
        }
    }
}

impl FailoverConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn reset_timeout(&self) -> Duration {
        Duration::from_millis(self.reset_timeout_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
