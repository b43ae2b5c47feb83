//! Demo binary wiring the resilience engine with a default check set.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use resilience_engine::resources::{ResourceKind, ResourceSampler, SysinfoSampler};
use resilience_engine::{check_fn, load_config, EngineConfig, ResilienceEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => EngineConfig::default(),
    };

    resilience_engine::observability::logging::init(&config.observability.log_level);

    tracing::info!(
        tick_interval_ms = config.monitor.tick_interval_ms,
        sample_interval_ms = config.resources.sample_interval_ms,
        proactive = config.proactive.enabled,
        "resilience-engine v0.1.0 starting"
    );

    let engine = ResilienceEngine::new(config);

    // Network connectivity: a well-known public resolver must be reachable.
    engine.register_health_check(
        "network_connectivity",
        check_fn(|| {
            let resolver = std::net::SocketAddr::from(([8, 8, 8, 8], 53));
            std::net::TcpStream::connect_timeout(&resolver, Duration::from_secs(5)).is_ok()
        }),
        Duration::from_secs(60),
        Duration::from_secs(10),
        3,
        true,
    );

    // System resources: memory and disk headroom.
    let sampler = Arc::new(SysinfoSampler::new());
    engine.register_health_check(
        "system_resources",
        check_fn(move || {
            let sample = sampler.sample();
            sample.memory_pct < 90.0 && sample.disk_pct < 95.0
        }),
        Duration::from_secs(45),
        Duration::from_secs(10),
        3,
        true,
    );

    engine.register_resource_action(
        ResourceKind::Cpu,
        Arc::new(|kind: ResourceKind, value: f64| {
            tracing::warn!(kind = %kind, value_pct = value, "Resource pressure detected");
        }),
    );

    engine.start().await?;
    tracing::info!("Engine running, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    engine.stop().await;

    let report = serde_json::to_string_pretty(&engine.system_health())?;
    tracing::info!(report = %report, "Final system health");

    tracing::info!("Shutdown complete");
    Ok(())
}
