//! Health check scheduling loop.
//!
//! # Responsibilities
//! - Own the set of registered checks and their component health
//! - Wake on a fixed cadence and evaluate every due check
//! - Drive the per-component state machine and trigger recovery on Failed
//!
//! # Design Decisions
//! - Checks within one tick run sequentially in registration order; a slow
//!   check delays the ones behind it. Evaluations of the same check can
//!   therefore never overlap.
//! - A check exceeding its deadline counts as a failure, but the blocking
//!   execution is not preempted; it finishes orphaned on the blocking pool.
//! - Recovery runs synchronously inside the tick so history stays ordered.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::error::EngineError;
use crate::health::check::{HealthCheck, HealthCheckSpec};
use crate::health::state::{ComponentHealth, ComponentStatus, FailureTransition};
use crate::observability::metrics;
use crate::recovery::RecoveryOrchestrator;

struct CheckEntry {
    spec: HealthCheckSpec,
    health: ComponentHealth,
    last_run: Option<Instant>,
}

/// Owns registered health checks and runs the scheduling loop.
pub struct HealthMonitor {
    tick_interval: Duration,
    entries: Mutex<Vec<CheckEntry>>,
    orchestrator: Arc<RecoveryOrchestrator>,
}

impl HealthMonitor {
    pub fn new(tick_interval: Duration, orchestrator: Arc<RecoveryOrchestrator>) -> Self {
        Self {
            tick_interval,
            entries: Mutex::new(Vec::new()),
            orchestrator,
        }
    }

    /// Add or replace a health check.
    ///
    /// Re-registration under an existing name replaces the spec but retains
    /// the component's accumulated health state, so a Failed component does
    /// not silently snap back to Healthy.
    pub fn register(&self, spec: HealthCheckSpec) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.iter_mut().find(|e| e.spec.name == spec.name) {
            tracing::debug!(component = %spec.name, "Replacing health check spec");
            entry.spec = spec;
        } else {
            tracing::info!(
                component = %spec.name,
                interval_ms = spec.interval.as_millis() as u64,
                timeout_ms = spec.timeout.as_millis() as u64,
                retry_count = spec.retry_count,
                critical = spec.critical,
                "Health check registered"
            );
            let health = ComponentHealth::new(spec.name.clone());
            entries.push(CheckEntry {
                spec,
                health,
                last_run: None,
            });
        }
    }

    /// Cloned snapshots of every component's health, in registration order.
    pub fn snapshot(&self) -> Vec<ComponentHealth> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.health.clone())
            .collect()
    }

    /// Snapshot of a single component.
    pub fn component(&self, name: &str) -> Result<ComponentHealth, EngineError> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.spec.name == name)
            .map(|e| e.health.clone())
            .ok_or_else(|| EngineError::UnknownComponent(name.to_string()))
    }

    /// Scheduling loop; exits on the shutdown signal.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            tick_interval_ms = self.tick_interval.as_millis() as u64,
            "Health monitor starting"
        );
        let mut ticker = tokio::time::interval(self.tick_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Evaluate every due check, sequentially in registration order.
    async fn tick(&self) {
        let due: Vec<DueCheck> = {
            let mut entries = self.entries.lock().unwrap();
            let now = Instant::now();
            entries
                .iter_mut()
                .filter(|e| match e.last_run {
                    Some(at) => now.duration_since(at) >= e.spec.interval,
                    None => true,
                })
                .map(|e| {
                    e.last_run = Some(now);
                    e.health.last_check = Some(now_unix());
                    DueCheck {
                        name: e.spec.name.clone(),
                        check: e.spec.check.clone(),
                        timeout: e.spec.timeout,
                        retry_count: e.spec.retry_count,
                        critical: e.spec.critical,
                    }
                })
                .collect()
        };

        for due_check in due {
            self.evaluate(due_check).await;
        }
    }

    async fn evaluate(&self, due: DueCheck) {
        let outcome = Self::execute_check(&due.name, due.check, due.timeout).await;
        metrics::record_check_result(&due.name, outcome.is_ok());

        let transition = {
            let mut entries = self.entries.lock().unwrap();
            let Some(entry) = entries.iter_mut().find(|e| e.spec.name == due.name) else {
                return;
            };
            match &outcome {
                Ok(()) => {
                    let before = entry.health.status;
                    entry.health.apply_success();
                    if before != entry.health.status {
                        tracing::info!(
                            component = %due.name,
                            status = %entry.health.status,
                            "Component status changed"
                        );
                    }
                    None
                }
                Err(err) => {
                    if due.critical {
                        tracing::error!(component = %due.name, error = %err, "Critical health check failed");
                    } else {
                        tracing::warn!(component = %due.name, error = %err, "Health check failed");
                    }
                    Some(entry.health.apply_failure(due.retry_count))
                }
            }
        };

        match transition {
            Some(FailureTransition::BecameFailed) => {
                tracing::error!(component = %due.name, "Component has failed, triggering recovery");
                let healed = self.orchestrator.execute_healing(&due.name).await;
                if healed {
                    let mut entries = self.entries.lock().unwrap();
                    if let Some(entry) = entries.iter_mut().find(|e| e.spec.name == due.name) {
                        if entry.health.status == ComponentStatus::Failed {
                            entry.health.status = ComponentStatus::Recovering;
                            tracing::info!(component = %due.name, "Component is recovering after healing");
                        }
                    }
                }
            }
            Some(FailureTransition::Degraded) => {
                let entries = self.entries.lock().unwrap();
                if let Some(entry) = entries.iter().find(|e| e.spec.name == due.name) {
                    tracing::warn!(
                        component = %due.name,
                        failures = entry.health.consecutive_failures,
                        retry_count = due.retry_count,
                        "Component is degraded"
                    );
                }
            }
            Some(FailureTransition::StillFailed) | None => {}
        }
    }

    /// Run one check on the blocking pool under a hard deadline.
    ///
    /// The deadline expiring does not cancel the execution; the result of an
    /// orphaned run is discarded.
    async fn execute_check(
        name: &str,
        check: Arc<dyn HealthCheck>,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        let handle = tokio::task::spawn_blocking(move || check.probe());
        match tokio::time::timeout(timeout, handle).await {
            Err(_) => Err(EngineError::CheckTimeout {
                name: name.to_string(),
                timeout,
            }),
            Ok(Err(join_err)) => Err(EngineError::CheckFailure {
                name: name.to_string(),
                reason: format!("check panicked: {}", join_err),
            }),
            Ok(Ok(Ok(true))) => Ok(()),
            Ok(Ok(Ok(false))) => Err(EngineError::CheckFailure {
                name: name.to_string(),
                reason: "predicate returned false".to_string(),
            }),
            Ok(Ok(Err(e))) => Err(EngineError::CheckFailure {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

struct DueCheck {
    name: String,
    check: Arc<dyn HealthCheck>,
    timeout: Duration,
    retry_count: u32,
    critical: bool,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::check::check_fn;
    use crate::recovery::strategy_fn;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    fn spec(name: &str, check: Arc<dyn HealthCheck>, retry_count: u32) -> HealthCheckSpec {
        HealthCheckSpec::new(
            name,
            check,
            Duration::ZERO,
            Duration::from_millis(200),
            retry_count,
            false,
        )
    }

    fn monitor_with(orchestrator: Arc<RecoveryOrchestrator>) -> HealthMonitor {
        HealthMonitor::new(Duration::from_millis(10), orchestrator)
    }

    #[tokio::test]
    async fn fails_on_third_consecutive_failure_and_triggers_recovery_once() {
        let orchestrator = Arc::new(RecoveryOrchestrator::new(50));
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        orchestrator.register_strategies(
            "svc",
            vec![strategy_fn("noop", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(false)
            })],
        );

        let monitor = monitor_with(orchestrator);
        monitor.register(spec("svc", check_fn(|| false), 3));

        monitor.tick().await;
        assert_eq!(monitor.component("svc").unwrap().status, ComponentStatus::Degraded);
        monitor.tick().await;
        assert_eq!(monitor.component("svc").unwrap().status, ComponentStatus::Degraded);
        monitor.tick().await;
        let health = monitor.component("svc").unwrap();
        assert_eq!(health.status, ComponentStatus::Failed);
        assert_eq!(health.consecutive_failures, 3);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        // Staying Failed does not re-trigger recovery.
        monitor.tick().await;
        assert_eq!(monitor.component("svc").unwrap().status, ComponentStatus::Failed);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn successful_healing_marks_component_recovering() {
        let orchestrator = Arc::new(RecoveryOrchestrator::new(50));
        orchestrator.register_strategies("svc", vec![strategy_fn("fix", || Ok(true))]);

        let monitor = monitor_with(orchestrator);
        monitor.register(spec("svc", check_fn(|| false), 1));

        monitor.tick().await;
        assert_eq!(
            monitor.component("svc").unwrap().status,
            ComponentStatus::Recovering
        );
    }

    #[tokio::test]
    async fn failed_component_recovers_through_passing_checks() {
        let orchestrator = Arc::new(RecoveryOrchestrator::new(50));
        let monitor = monitor_with(orchestrator);

        let healthy = Arc::new(AtomicBool::new(false));
        let flag = healthy.clone();
        monitor.register(spec(
            "svc",
            check_fn(move || flag.load(Ordering::SeqCst)),
            1,
        ));

        monitor.tick().await;
        assert_eq!(monitor.component("svc").unwrap().status, ComponentStatus::Failed);

        healthy.store(true, Ordering::SeqCst);
        monitor.tick().await;
        assert_eq!(
            monitor.component("svc").unwrap().status,
            ComponentStatus::Recovering
        );
        monitor.tick().await;
        let health = monitor.component("svc").unwrap();
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert_eq!(health.consecutive_failures, 0);
    }

    #[tokio::test]
    async fn timeout_counts_as_failure_without_preemption() {
        let orchestrator = Arc::new(RecoveryOrchestrator::new(50));
        let monitor = monitor_with(orchestrator);

        let slow = check_fn(|| {
            std::thread::sleep(Duration::from_millis(200));
            true
        });
        monitor.register(HealthCheckSpec::new(
            "slow",
            slow,
            Duration::ZERO,
            Duration::from_millis(10),
            1,
            false,
        ));

        monitor.tick().await;
        assert_eq!(monitor.component("slow").unwrap().status, ComponentStatus::Failed);
    }

    #[tokio::test]
    async fn check_error_counts_as_failure() {
        let orchestrator = Arc::new(RecoveryOrchestrator::new(50));
        let monitor = monitor_with(orchestrator);
        monitor.register(spec(
            "err",
            Arc::new(|| -> Result<bool, crate::error::BoxError> { Err("probe exploded".into()) }),
            1,
        ));

        monitor.tick().await;
        assert_eq!(monitor.component("err").unwrap().status, ComponentStatus::Failed);
    }

    #[tokio::test]
    async fn reregistration_keeps_existing_state() {
        let orchestrator = Arc::new(RecoveryOrchestrator::new(50));
        let monitor = monitor_with(orchestrator);
        monitor.register(spec("svc", check_fn(|| false), 1));

        monitor.tick().await;
        assert_eq!(monitor.component("svc").unwrap().status, ComponentStatus::Failed);

        monitor.register(spec("svc", check_fn(|| false), 1));
        let health = monitor.component("svc").unwrap();
        assert_eq!(health.status, ComponentStatus::Failed);
        assert_eq!(health.consecutive_failures, 1);
    }

    #[tokio::test]
    async fn interval_gates_evaluation() {
        let orchestrator = Arc::new(RecoveryOrchestrator::new(50));
        let monitor = monitor_with(orchestrator);

        let evaluations = Arc::new(AtomicU32::new(0));
        let counter = evaluations.clone();
        monitor.register(HealthCheckSpec::new(
            "rare",
            check_fn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
            Duration::from_secs(3600),
            Duration::from_millis(200),
            3,
            false,
        ));

        monitor.tick().await;
        monitor.tick().await;
        monitor.tick().await;
        assert_eq!(evaluations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_component_is_an_error() {
        let orchestrator = Arc::new(RecoveryOrchestrator::new(50));
        let monitor = monitor_with(orchestrator);
        assert!(matches!(
            monitor.component("ghost"),
            Err(EngineError::UnknownComponent(_))
        ));
    }
}
