//! Endpoint failover management.
//!
//! # Responsibilities
//! - Track primary/fallback address lists per named service
//! - Probe the current address through the group's circuit breaker
//! - Rotate to the next address after a failed or rejected probe
//!
//! # Design Decisions
//! - Rotation is cyclic: primary → fallbacks in order → back to primary
//! - `check_endpoint` reports the pre-rotation probe result; callers read the
//!   rotated address with `endpoint()` afterwards
//! - One breaker per service group, so a flapping service opens its own
//!   circuit without affecting other groups

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::config::FailoverConfig;
use crate::error::EngineError;
use crate::failover::prober::EndpointProber;
use crate::resilience::{CircuitBreaker, CircuitError};

struct EndpointGroup {
    primary: String,
    fallbacks: Vec<String>,
    current: String,
    breaker: Arc<CircuitBreaker>,
}

impl EndpointGroup {
    /// Advance `current` after a failed probe. Invariant: `current` is always
    /// the primary or one of the fallbacks.
    fn rotate(&mut self, service: &str) {
        if self.current == self.primary {
            match self.fallbacks.first() {
                Some(first) => {
                    self.current = first.clone();
                    tracing::warn!(
                        service = %service,
                        endpoint = %self.current,
                        "Switching from primary to first fallback"
                    );
                }
                None => {
                    tracing::warn!(
                        service = %service,
                        "Primary endpoint unavailable and no fallbacks registered"
                    );
                }
            }
            return;
        }

        let position = self.fallbacks.iter().position(|f| *f == self.current);
        match position {
            Some(i) if i + 1 < self.fallbacks.len() => {
                self.current = self.fallbacks[i + 1].clone();
                tracing::warn!(
                    service = %service,
                    endpoint = %self.current,
                    "Switching to next fallback"
                );
            }
            _ => {
                self.current = self.primary.clone();
                tracing::warn!(
                    service = %service,
                    endpoint = %self.current,
                    "Cycling back to primary endpoint"
                );
            }
        }
    }
}

/// Manages primary/fallback endpoint groups per named service.
pub struct EndpointFailover {
    groups: DashMap<String, EndpointGroup>,
    prober: Arc<dyn EndpointProber>,
    fail_max: u32,
    reset_timeout: Duration,
}

impl EndpointFailover {
    pub fn new(config: &FailoverConfig, prober: Arc<dyn EndpointProber>) -> Self {
        Self {
            groups: DashMap::new(),
            prober,
            fail_max: config.fail_max,
            reset_timeout: config.reset_timeout(),
        }
    }

    /// Register a service with its primary address and ordered fallbacks.
    ///
    /// Re-registration resets the group back to its primary.
    pub fn register_endpoint(
        &self,
        name: impl Into<String>,
        primary: impl Into<String>,
        fallbacks: Vec<String>,
    ) {
        let name = name.into();
        let primary = primary.into();
        tracing::info!(
            service = %name,
            primary = %primary,
            fallback_count = fallbacks.len(),
            "Endpoint group registered"
        );
        let breaker = Arc::new(CircuitBreaker::new(
            format!("endpoint_{}", name),
            self.fail_max,
            self.reset_timeout,
        ));
        self.groups.insert(
            name,
            EndpointGroup {
                current: primary.clone(),
                primary,
                fallbacks,
                breaker,
            },
        );
    }

    /// Current address for a service.
    pub fn endpoint(&self, name: &str) -> Result<String, EngineError> {
        self.groups
            .get(name)
            .map(|g| g.current.clone())
            .ok_or_else(|| EngineError::UnknownEndpoint(name.to_string()))
    }

    /// Probe the service's current address, rotating on failure.
    ///
    /// Returns whether the pre-rotation probe succeeded. A breaker rejection
    /// counts as a failed probe without touching the network.
    pub async fn check_endpoint(&self, name: &str) -> Result<bool, EngineError> {
        let (current, breaker) = {
            let group = self
                .groups
                .get(name)
                .ok_or_else(|| EngineError::UnknownEndpoint(name.to_string()))?;
            (group.current.clone(), group.breaker.clone())
        };

        let prober = self.prober.clone();
        let result = breaker.call(|| prober.probe(&current)).await;

        match result {
            Ok(()) => {
                tracing::debug!(service = %name, endpoint = %current, "Endpoint probe succeeded");
                Ok(true)
            }
            Err(err) => {
                match &err {
                    CircuitError::Rejected(breaker_name) => {
                        tracing::warn!(
                            service = %name,
                            breaker = %breaker_name,
                            "Circuit open, skipping probe and rotating endpoint"
                        );
                    }
                    CircuitError::Operation(e) => {
                        tracing::warn!(
                            service = %name,
                            endpoint = %current,
                            error = %e,
                            "Endpoint probe failed"
                        );
                    }
                }
                if let Some(mut group) = self.groups.get_mut(name) {
                    group.rotate(name);
                }
                Ok(false)
            }
        }
    }
}
