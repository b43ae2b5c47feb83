//! System resource sampling.
//!
//! # Responsibilities
//! - Define the `ResourceSampler` seam so tests can inject fixed samples
//! - Provide the production implementation backed by the `sysinfo` crate
//!
//! # Design Decisions
//! - One persistent `System` behind a lock; CPU usage needs successive
//!   refreshes of the same instance to be meaningful
//! - Disk utilization reports the fullest mount, the one that will hurt first

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use sysinfo::{Disks, System};

/// Watched resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Cpu,
    Memory,
    Disk,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Cpu, ResourceKind::Memory, ResourceKind::Disk];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Cpu => "cpu",
            ResourceKind::Memory => "memory",
            ResourceKind::Disk => "disk",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One utilization sample, all values in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceSample {
    pub cpu_pct: f64,
    pub memory_pct: f64,
    pub disk_pct: f64,
}

impl ResourceSample {
    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Cpu => self.cpu_pct,
            ResourceKind::Memory => self.memory_pct,
            ResourceKind::Disk => self.disk_pct,
        }
    }
}

/// Source of utilization samples.
pub trait ResourceSampler: Send + Sync {
    fn sample(&self) -> ResourceSample;
}

/// Production sampler backed by the `sysinfo` crate.
pub struct SysinfoSampler {
    system: Mutex<System>,
}

impl SysinfoSampler {
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_all();
        Self {
            system: Mutex::new(system),
        }
    }
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSampler for SysinfoSampler {
    fn sample(&self) -> ResourceSample {
        let (cpu_pct, memory_pct) = {
            let mut system = self.system.lock().unwrap();
            system.refresh_cpu_all();
            system.refresh_memory();

            let cpu = system.global_cpu_usage() as f64;
            let total = system.total_memory();
            let memory = if total > 0 {
                (system.used_memory() as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            (cpu, memory)
        };

        let disks = Disks::new_with_refreshed_list();
        let disk_pct = disks
            .iter()
            .filter(|d| d.total_space() > 0)
            .map(|d| {
                let total = d.total_space() as f64;
                let used = total - d.available_space() as f64;
                (used / total) * 100.0
            })
            .fold(0.0_f64, f64::max);

        ResourceSample {
            cpu_pct,
            memory_pct,
            disk_pct,
        }
    }
}
