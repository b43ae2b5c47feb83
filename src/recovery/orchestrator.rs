//! Recovery orchestration.
//!
//! # Responsibilities
//! - Hold the ordered strategy list per component
//! - Execute strategies in order, first success wins
//! - Record every attempt durably, in execution order
//! - Run the proactive healing loop over Degraded components
//!
//! # Design Decisions
//! - Healing is synchronous on the calling context (monitor tick or proactive
//!   loop), deliberately not fire-and-forget, so history stays ordered
//! - A strategy error is recorded and the next strategy still runs
//! - The proactive path never mutates component status; the monitor loop is
//!   the single status writer

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::error::EngineError;
use crate::health::{ComponentStatus, HealthMonitor};
use crate::observability::metrics;
use crate::recovery::strategy::{RecoveryRecord, RecoveryStrategy};

/// Holds recovery strategies per component and the attempt history.
pub struct RecoveryOrchestrator {
    strategies: DashMap<String, Vec<Arc<dyn RecoveryStrategy>>>,
    history: Mutex<Vec<RecoveryRecord>>,
    default_history_limit: usize,
}

impl RecoveryOrchestrator {
    pub fn new(default_history_limit: usize) -> Self {
        Self {
            strategies: DashMap::new(),
            history: Mutex::new(Vec::new()),
            default_history_limit,
        }
    }

    /// Associate an ordered strategy list with a component name.
    pub fn register_strategies(
        &self,
        component: impl Into<String>,
        strategies: Vec<Arc<dyn RecoveryStrategy>>,
    ) {
        let component = component.into();
        tracing::info!(
            component = %component,
            strategy_count = strategies.len(),
            "Recovery strategies registered"
        );
        self.strategies.insert(component, strategies);
    }

    pub fn has_strategies(&self, component: &str) -> bool {
        self.strategies.contains_key(component)
    }

    /// Run the component's strategies in order, stopping at the first success.
    ///
    /// Returns true if some strategy healed the component. Every attempt is
    /// recorded; errors are captured per strategy and do not abort the rest.
    pub async fn execute_healing(&self, component: &str) -> bool {
        let Some(strategies) = self.strategies.get(component).map(|s| s.value().clone()) else {
            tracing::warn!(component = %component, "No recovery strategies registered");
            return false;
        };

        for (index, strategy) in strategies.iter().enumerate() {
            let name = strategy.name().to_string();
            tracing::info!(
                component = %component,
                strategy = %name,
                attempt = index + 1,
                total = strategies.len(),
                "Executing recovery strategy"
            );

            let runner = strategy.clone();
            let result = tokio::task::spawn_blocking(move || runner.attempt()).await;
            let (success, error) = match result {
                Ok(Ok(healed)) => (healed, None),
                Ok(Err(e)) => {
                    let err = EngineError::RecoveryStrategy {
                        component: component.to_string(),
                        strategy: name.clone(),
                        reason: e.to_string(),
                    };
                    tracing::warn!(error = %err, "Recovery strategy raised");
                    (false, Some(e.to_string()))
                }
                Err(join_err) => {
                    tracing::error!(
                        component = %component,
                        strategy = %name,
                        error = %join_err,
                        "Recovery strategy panicked"
                    );
                    (false, Some(format!("strategy panicked: {}", join_err)))
                }
            };

            metrics::record_recovery_attempt(component, success);
            self.history
                .lock()
                .unwrap()
                .push(RecoveryRecord::new(component, index, &name, success, error));

            if success {
                tracing::info!(component = %component, strategy = %name, "Recovery strategy succeeded");
                return true;
            }
            tracing::warn!(component = %component, strategy = %name, "Recovery strategy failed");
        }

        tracing::error!(component = %component, "All recovery strategies failed");
        false
    }

    /// Most recent attempts first, optionally filtered by component.
    ///
    /// `limit` defaults to the configured history limit.
    pub fn history(&self, component: Option<&str>, limit: Option<usize>) -> Vec<RecoveryRecord> {
        let limit = limit.unwrap_or(self.default_history_limit);
        let history = self.history.lock().unwrap();
        history
            .iter()
            .rev()
            .filter(|r| component.map_or(true, |c| r.component == c))
            .take(limit)
            .cloned()
            .collect()
    }
}

/// Proactive healing loop: preemptively heals Degraded components on an
/// independent cadence, distinct from the reactive Failed-transition trigger.
pub async fn run_proactive(
    orchestrator: Arc<RecoveryOrchestrator>,
    monitor: Arc<HealthMonitor>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    tracing::info!(
        interval_ms = interval.as_millis() as u64,
        "Proactive healing loop starting"
    );
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for health in monitor.snapshot() {
                    if health.status == ComponentStatus::Degraded {
                        tracing::info!(
                            component = %health.name,
                            "Proactively healing degraded component"
                        );
                        orchestrator.execute_healing(&health.name).await;
                    }
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Proactive healing loop received shutdown signal, exiting");
                break;
            }
        }
    }
}
