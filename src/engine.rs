//! Engine facade composing the resilience subsystems.
//!
//! # Responsibilities
//! - Expose the registration/query surface collaborators use
//! - Own process-wide lifecycle: start/stop of the scheduler tasks
//! - Aggregate per-component health into a system-wide report
//!
//! # Design Decisions
//! - No global singletons: the embedding process owns the engine instance and
//!   hands it to collaborators
//! - start() is fallible and all-or-nothing; an engine that is not running
//!   cannot guarantee resilience
//! - stop() is idempotent with a bounded join per scheduler task

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::failover::{EndpointFailover, EndpointProber, TcpProber};
use crate::health::{ComponentHealth, ComponentStatus, HealthCheck, HealthCheckSpec, HealthMonitor};
use crate::lifecycle::{Shutdown, TaskSet};
use crate::recovery::{run_proactive, RecoveryOrchestrator, RecoveryRecord, RecoveryStrategy};
use crate::resources::{ResourceAction, ResourceKind, ResourceSampler, ResourceWatcher, SysinfoSampler};

/// How long `stop()` waits for each scheduler task to finish its tick.
const STOP_DEADLINE: Duration = Duration::from_secs(5);

/// Aggregate system status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    /// No component is Failed.
    Healthy,
    /// Some components Failed, some still Healthy.
    Degraded,
    /// No component is Healthy.
    Critical,
}

/// Per-component entry in the system health report.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    pub status: ComponentStatus,
    pub last_check: Option<u64>,
    pub failure_count: u32,
}

/// System-wide health report.
#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub overall_status: OverallStatus,
    pub total_components: usize,
    pub healthy: usize,
    pub failed: usize,
    pub components: BTreeMap<String, ComponentReport>,
}

/// Process-wide resilience engine.
///
/// Composes the health monitor, recovery orchestrator, resource watcher and
/// endpoint failover manager behind one registration/query surface.
pub struct ResilienceEngine {
    config: EngineConfig,
    monitor: Arc<HealthMonitor>,
    orchestrator: Arc<RecoveryOrchestrator>,
    watcher: Arc<ResourceWatcher>,
    failover: Arc<EndpointFailover>,
    shutdown: Shutdown,
    tasks: tokio::sync::Mutex<TaskSet>,
    running: AtomicBool,
}

impl ResilienceEngine {
    /// Build an engine with the production sampler and TCP prober.
    pub fn new(config: EngineConfig) -> Self {
        let prober = Arc::new(TcpProber::new(config.failover.probe_timeout()));
        Self::with_parts(config, Arc::new(SysinfoSampler::new()), prober)
    }

    /// Build an engine with injected sampler/prober implementations.
    pub fn with_parts(
        config: EngineConfig,
        sampler: Arc<dyn ResourceSampler>,
        prober: Arc<dyn EndpointProber>,
    ) -> Self {
        let orchestrator = Arc::new(RecoveryOrchestrator::new(config.recovery.history_limit));
        let monitor = Arc::new(HealthMonitor::new(
            config.monitor.tick_interval(),
            orchestrator.clone(),
        ));
        let watcher = Arc::new(ResourceWatcher::new(&config.resources, sampler));
        let failover = Arc::new(EndpointFailover::new(&config.failover, prober));
        Self {
            config,
            monitor,
            orchestrator,
            watcher,
            failover,
            shutdown: Shutdown::new(),
            tasks: tokio::sync::Mutex::new(TaskSet::new()),
            running: AtomicBool::new(false),
        }
    }

    // --- Registration surface ---

    /// Register (or replace) a health check for a named component.
    pub fn register_health_check(
        &self,
        name: impl Into<String>,
        check: Arc<dyn HealthCheck>,
        interval: Duration,
        timeout: Duration,
        retry_count: u32,
        critical: bool,
    ) {
        self.monitor.register(HealthCheckSpec::new(
            name,
            check,
            interval,
            timeout,
            retry_count,
            critical,
        ));
    }

    /// Register the ordered recovery strategies for a component.
    pub fn register_recovery_strategies(
        &self,
        component: impl Into<String>,
        strategies: Vec<Arc<dyn RecoveryStrategy>>,
    ) {
        self.orchestrator.register_strategies(component, strategies);
    }

    /// Register an endpoint group with primary and ordered fallbacks.
    pub fn register_endpoint(
        &self,
        name: impl Into<String>,
        primary: impl Into<String>,
        fallbacks: Vec<String>,
    ) {
        self.failover.register_endpoint(name, primary, fallbacks);
    }

    /// Set the percentage threshold for a resource kind.
    pub fn set_resource_threshold(&self, kind: ResourceKind, percentage: f64) {
        self.watcher.set_threshold(kind, percentage);
    }

    /// Register an action fired on every over-threshold sample for `kind`.
    pub fn register_resource_action(&self, kind: ResourceKind, action: Arc<dyn ResourceAction>) {
        self.watcher.register_action(kind, action);
    }

    // --- Query surface ---

    /// Current address for a registered endpoint group.
    pub fn endpoint(&self, name: &str) -> Result<String, EngineError> {
        self.failover.endpoint(name)
    }

    /// Probe an endpoint through its breaker, rotating on failure.
    pub async fn check_endpoint(&self, name: &str) -> Result<bool, EngineError> {
        self.failover.check_endpoint(name).await
    }

    /// Health snapshot for one component.
    pub fn component_health(&self, name: &str) -> Result<ComponentHealth, EngineError> {
        self.monitor.component(name)
    }

    /// Recovery history, most recent first.
    pub fn recovery_history(
        &self,
        component: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<RecoveryRecord> {
        self.orchestrator.history(component, limit)
    }

    /// Manually trigger healing for a component.
    pub async fn force_recovery(&self, component: &str) -> Result<bool, EngineError> {
        if !self.orchestrator.has_strategies(component) {
            return Err(EngineError::UnknownComponent(component.to_string()));
        }
        Ok(self.orchestrator.execute_healing(component).await)
    }

    /// Aggregate health report across all registered components.
    pub fn system_health(&self) -> SystemHealth {
        let snapshots = self.monitor.snapshot();
        let total_components = snapshots.len();
        let healthy = snapshots
            .iter()
            .filter(|h| h.status == ComponentStatus::Healthy)
            .count();
        let failed = snapshots
            .iter()
            .filter(|h| h.status == ComponentStatus::Failed)
            .count();

        let overall_status = if failed == 0 {
            OverallStatus::Healthy
        } else if healthy == 0 {
            OverallStatus::Critical
        } else {
            OverallStatus::Degraded
        };

        let components = snapshots
            .into_iter()
            .map(|h| {
                (
                    h.name,
                    ComponentReport {
                        status: h.status,
                        last_check: h.last_check,
                        failure_count: h.consecutive_failures,
                    },
                )
            })
            .collect();

        SystemHealth {
            overall_status,
            total_components,
            healthy,
            failed,
            components,
        }
    }

    // --- Lifecycle ---

    /// Spawn the scheduler tasks.
    pub async fn start(&self) -> Result<(), EngineError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(EngineError::AlreadyRunning);
        }

        let mut tasks = self.tasks.lock().await;
        tasks.spawn(
            "health-monitor",
            self.monitor.clone().run(self.shutdown.subscribe()),
        );
        tasks.spawn(
            "resource-watcher",
            self.watcher.clone().run(self.shutdown.subscribe()),
        );
        if self.config.proactive.enabled {
            tasks.spawn(
                "proactive-healing",
                run_proactive(
                    self.orchestrator.clone(),
                    self.monitor.clone(),
                    self.config.proactive.interval(),
                    self.shutdown.subscribe(),
                ),
            );
        }

        tracing::info!(
            proactive = self.config.proactive.enabled,
            "Resilience engine started"
        );
        Ok(())
    }

    /// Signal shutdown and wait, bounded, for the schedulers to exit.
    ///
    /// Idempotent; a second call is a no-op.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.shutdown.trigger();
        self.tasks.lock().await.join_all(STOP_DEADLINE).await;
        tracing::info!("Resilience engine stopped");
    }
}
