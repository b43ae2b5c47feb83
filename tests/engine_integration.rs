//! Facade-level integration tests for the resilience engine.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;
use resilience_engine::config::EngineConfig;
use resilience_engine::resources::{ResourceSample, ResourceSampler};
use resilience_engine::{
    check_fn, strategy_fn, BoxError, ComponentStatus, EndpointProber, EngineError, OverallStatus,
    ResilienceEngine,
};

/// Sampler that always reports an idle system.
struct IdleSampler;

impl ResourceSampler for IdleSampler {
    fn sample(&self) -> ResourceSample {
        ResourceSample {
            cpu_pct: 1.0,
            memory_pct: 1.0,
            disk_pct: 1.0,
        }
    }
}

/// Prober that replays a scripted sequence, then keeps failing.
struct ScriptedProber {
    outcomes: Mutex<Vec<bool>>,
}

impl EndpointProber for ScriptedProber {
    fn probe<'a>(&'a self, _addr: &'a str) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            let mut outcomes = self.outcomes.lock().unwrap();
            let up = if outcomes.is_empty() {
                false
            } else {
                outcomes.remove(0)
            };
            if up {
                Ok(())
            } else {
                Err("connection refused".into())
            }
        })
    }
}

fn test_engine(outcomes: Vec<bool>) -> ResilienceEngine {
    let mut config = EngineConfig::default();
    config.monitor.tick_interval_ms = 10;
    config.resources.sample_interval_ms = 10;
    config.proactive.enabled = false;
    config.failover.fail_max = 10;
    ResilienceEngine::with_parts(
        config,
        Arc::new(IdleSampler),
        Arc::new(ScriptedProber {
            outcomes: Mutex::new(outcomes),
        }),
    )
}

fn quick_check(engine: &ResilienceEngine, name: &str, result: bool, retry_count: u32) {
    engine.register_health_check(
        name,
        check_fn(move || result),
        Duration::ZERO,
        Duration::from_millis(200),
        retry_count,
        false,
    );
}

#[tokio::test]
async fn system_health_reports_degraded_with_one_failed_component() {
    let engine = test_engine(vec![]);
    quick_check(&engine, "alpha", true, 3);
    quick_check(&engine, "beta", true, 3);
    quick_check(&engine, "gamma", false, 1);

    engine.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    engine.stop().await;

    let health = engine.system_health();
    assert_eq!(health.overall_status, OverallStatus::Degraded);
    assert_eq!(health.total_components, 3);
    assert_eq!(health.healthy, 2);
    assert_eq!(health.failed, 1);
    assert_eq!(health.components["gamma"].status, ComponentStatus::Failed);
    assert!(health.components["alpha"].last_check.is_some());

    let json = serde_json::to_value(&health).unwrap();
    assert_eq!(json["overall_status"], "degraded");
    assert_eq!(json["components"]["gamma"]["status"], "failed");
}

#[tokio::test]
async fn empty_engine_reports_healthy() {
    let engine = test_engine(vec![]);
    let health = engine.system_health();
    assert_eq!(health.overall_status, OverallStatus::Healthy);
    assert_eq!(health.total_components, 0);
}

#[tokio::test]
async fn all_failed_reports_critical() {
    let engine = test_engine(vec![]);
    quick_check(&engine, "only", false, 1);

    engine.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    engine.stop().await;

    assert_eq!(engine.system_health().overall_status, OverallStatus::Critical);
}

#[tokio::test]
async fn failed_transition_triggers_registered_strategies() {
    let engine = test_engine(vec![]);
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();
    engine.register_recovery_strategies(
        "flaky",
        vec![
            strategy_fn("restart_listener", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(false)
            }),
            strategy_fn("reload_config", || Ok(false)),
        ],
    );
    quick_check(&engine, "flaky", false, 2);

    engine.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    engine.stop().await;

    assert!(attempts.load(Ordering::SeqCst) >= 1);
    let history = engine.recovery_history(Some("flaky"), None);
    assert!(!history.is_empty());
    assert_eq!(history[0].component, "flaky");
    // Both strategies failed, so records exist for each index in order.
    assert!(history.iter().any(|r| r.strategy == "restart_listener"));
    assert!(history.iter().any(|r| r.strategy == "reload_config"));
}

#[tokio::test]
async fn proactive_loop_heals_degraded_without_touching_status() {
    let mut config = EngineConfig::default();
    config.monitor.tick_interval_ms = 10;
    config.resources.sample_interval_ms = 10;
    config.proactive.enabled = true;
    config.proactive.interval_ms = 20;
    let engine = ResilienceEngine::with_parts(
        config,
        Arc::new(IdleSampler),
        Arc::new(ScriptedProber {
            outcomes: Mutex::new(vec![]),
        }),
    );

    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();
    engine.register_recovery_strategies(
        "lagging",
        vec![strategy_fn("nudge", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        })],
    );
    // A retry_count the test never reaches pins the component at Degraded,
    // so only the proactive loop can trigger healing.
    quick_check(&engine, "lagging", false, 100);

    engine.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    engine.stop().await;

    assert!(attempts.load(Ordering::SeqCst) >= 1);
    assert_eq!(
        engine.component_health("lagging").unwrap().status,
        ComponentStatus::Degraded
    );
    let history = engine.recovery_history(Some("lagging"), None);
    assert!(!history.is_empty());
    assert!(history.iter().all(|r| !r.success));
}

#[tokio::test]
async fn double_start_is_rejected_and_stop_is_idempotent() {
    let engine = test_engine(vec![]);
    engine.start().await.unwrap();
    assert!(matches!(
        engine.start().await,
        Err(EngineError::AlreadyRunning)
    ));
    engine.stop().await;
    engine.stop().await;
}

#[tokio::test]
async fn endpoint_failover_rotates_through_facade() {
    let engine = test_engine(vec![false, false, false]);
    engine.register_endpoint(
        "c2_channel",
        "10.0.0.1:4444",
        vec!["10.0.0.2:4444".into(), "10.0.0.3:4444".into()],
    );

    assert_eq!(engine.endpoint("c2_channel").unwrap(), "10.0.0.1:4444");
    assert!(!engine.check_endpoint("c2_channel").await.unwrap());
    assert_eq!(engine.endpoint("c2_channel").unwrap(), "10.0.0.2:4444");
    assert!(!engine.check_endpoint("c2_channel").await.unwrap());
    assert_eq!(engine.endpoint("c2_channel").unwrap(), "10.0.0.3:4444");
    assert!(!engine.check_endpoint("c2_channel").await.unwrap());
    assert_eq!(engine.endpoint("c2_channel").unwrap(), "10.0.0.1:4444");
}

#[tokio::test]
async fn force_recovery_requires_registered_strategies() {
    let engine = test_engine(vec![]);
    assert!(matches!(
        engine.force_recovery("ghost").await,
        Err(EngineError::UnknownComponent(_))
    ));

    engine.register_recovery_strategies("svc", vec![strategy_fn("fix", || Ok(true))]);
    assert!(engine.force_recovery("svc").await.unwrap());
    assert_eq!(engine.recovery_history(Some("svc"), None).len(), 1);
}

#[tokio::test]
async fn reregistration_does_not_reset_failed_component() {
    let engine = test_engine(vec![]);
    quick_check(&engine, "svc", false, 1);

    engine.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    engine.stop().await;
    assert_eq!(
        engine.component_health("svc").unwrap().status,
        ComponentStatus::Failed
    );

    quick_check(&engine, "svc", false, 1);
    assert_eq!(
        engine.component_health("svc").unwrap().status,
        ComponentStatus::Failed
    );
}
