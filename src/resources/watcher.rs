//! Resource threshold watchdog.
//!
//! # Responsibilities
//! - Sample cpu/memory/disk utilization on a fixed cadence
//! - Fire every registered action for a kind whose sample is over threshold
//!
//! # Design Decisions
//! - No debouncing: actions fire on every over-threshold sample while the
//!   condition holds. Callers needing suppression implement it themselves.
//! - Sampling happens on the blocking pool; sysinfo reads block

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;

use crate::config::ResourceConfig;
use crate::observability::metrics;
use crate::resources::sampler::{ResourceKind, ResourceSampler};

/// Action invoked when a resource exceeds its threshold.
pub trait ResourceAction: Send + Sync {
    fn trigger(&self, kind: ResourceKind, value: f64);
}

impl<F> ResourceAction for F
where
    F: Fn(ResourceKind, f64) + Send + Sync,
{
    fn trigger(&self, kind: ResourceKind, value: f64) {
        self(kind, value)
    }
}

/// Samples system resources and fires threshold-exceeded actions.
pub struct ResourceWatcher {
    sampler: Arc<dyn ResourceSampler>,
    sample_interval: Duration,
    thresholds: Mutex<HashMap<ResourceKind, f64>>,
    actions: Mutex<HashMap<ResourceKind, Vec<Arc<dyn ResourceAction>>>>,
}

impl ResourceWatcher {
    pub fn new(config: &ResourceConfig, sampler: Arc<dyn ResourceSampler>) -> Self {
        let thresholds = HashMap::from([
            (ResourceKind::Cpu, config.cpu_threshold_pct),
            (ResourceKind::Memory, config.memory_threshold_pct),
            (ResourceKind::Disk, config.disk_threshold_pct),
        ]);
        Self {
            sampler,
            sample_interval: config.sample_interval(),
            thresholds: Mutex::new(thresholds),
            actions: Mutex::new(HashMap::new()),
        }
    }

    /// Set the percentage threshold for a resource kind.
    pub fn set_threshold(&self, kind: ResourceKind, percentage: f64) {
        tracing::info!(kind = %kind, threshold_pct = percentage, "Resource threshold set");
        self.thresholds.lock().unwrap().insert(kind, percentage);
    }

    /// Register an action fired on every over-threshold sample for `kind`.
    pub fn register_action(&self, kind: ResourceKind, action: Arc<dyn ResourceAction>) {
        self.actions
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push(action);
    }

    /// Sampling loop; exits on the shutdown signal.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            sample_interval_ms = self.sample_interval.as_millis() as u64,
            "Resource watcher starting"
        );
        let mut ticker = tokio::time::interval(self.sample_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sample_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Resource watcher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Take one sample and fire actions for every kind over its threshold.
    async fn sample_once(&self) {
        let sampler = self.sampler.clone();
        let sample = match tokio::task::spawn_blocking(move || sampler.sample()).await {
            Ok(sample) => sample,
            Err(e) => {
                tracing::error!(error = %e, "Resource sampling panicked");
                return;
            }
        };

        for kind in ResourceKind::ALL {
            let value = sample.get(kind);
            metrics::record_resource_sample(kind.as_str(), value);

            let threshold = self
                .thresholds
                .lock()
                .unwrap()
                .get(&kind)
                .copied()
                .unwrap_or(100.0);
            if value >= threshold {
                metrics::record_threshold_breach(kind.as_str());
                tracing::warn!(
                    kind = %kind,
                    value_pct = value,
                    threshold_pct = threshold,
                    "Resource threshold exceeded"
                );
                let actions = self
                    .actions
                    .lock()
                    .unwrap()
                    .get(&kind)
                    .cloned()
                    .unwrap_or_default();
                for action in actions {
                    action.trigger(kind, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::sampler::ResourceSample;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedSampler {
        sample: Mutex<ResourceSample>,
    }

    impl FixedSampler {
        fn new(sample: ResourceSample) -> Arc<Self> {
            Arc::new(Self {
                sample: Mutex::new(sample),
            })
        }
    }

    impl ResourceSampler for FixedSampler {
        fn sample(&self) -> ResourceSample {
            *self.sample.lock().unwrap()
        }
    }

    fn watcher_with(sample: ResourceSample) -> ResourceWatcher {
        let config = ResourceConfig {
            sample_interval_ms: 5,
            ..Default::default()
        };
        ResourceWatcher::new(&config, FixedSampler::new(sample))
    }

    #[tokio::test]
    async fn fires_on_every_over_threshold_sample() {
        let watcher = watcher_with(ResourceSample {
            cpu_pct: 95.0,
            ..Default::default()
        });
        watcher.set_threshold(ResourceKind::Cpu, 90.0);

        let fired = Arc::new(AtomicU32::new(0));
        let counter = fired.clone();
        watcher.register_action(
            ResourceKind::Cpu,
            Arc::new(move |kind: ResourceKind, value: f64| {
                assert_eq!(kind, ResourceKind::Cpu);
                assert_eq!(value, 95.0);
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        // No suppression across consecutive samples.
        watcher.sample_once().await;
        watcher.sample_once().await;
        watcher.sample_once().await;
        assert_eq!(fired.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn sample_at_threshold_fires() {
        let watcher = watcher_with(ResourceSample {
            memory_pct: 90.0,
            ..Default::default()
        });
        watcher.set_threshold(ResourceKind::Memory, 90.0);

        let fired = Arc::new(AtomicU32::new(0));
        let counter = fired.clone();
        watcher.register_action(
            ResourceKind::Memory,
            Arc::new(move |_: ResourceKind, _: f64| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        watcher.sample_once().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn below_threshold_does_not_fire() {
        let watcher = watcher_with(ResourceSample {
            disk_pct: 50.0,
            ..Default::default()
        });
        watcher.set_threshold(ResourceKind::Disk, 90.0);

        let fired = Arc::new(AtomicU32::new(0));
        let counter = fired.clone();
        watcher.register_action(
            ResourceKind::Disk,
            Arc::new(move |_: ResourceKind, _: f64| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        watcher.sample_once().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_registered_action_fires() {
        let watcher = watcher_with(ResourceSample {
            cpu_pct: 99.0,
            ..Default::default()
        });
        watcher.set_threshold(ResourceKind::Cpu, 90.0);

        let fired = Arc::new(AtomicU32::new(0));
        for _ in 0..3 {
            let counter = fired.clone();
            watcher.register_action(
                ResourceKind::Cpu,
                Arc::new(move |_: ResourceKind, _: f64| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        watcher.sample_once().await;
        assert_eq!(fired.load(Ordering::SeqCst), 3);
    }
}
