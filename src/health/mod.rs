//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (check.rs):
//!     HealthCheckSpec → monitor.rs registry
//!
//! Scheduling loop (monitor.rs):
//!     Fixed-cadence tick
//!     → evaluate due checks sequentially, each under its timeout
//!     → state.rs transitions per component
//!     → Failed transition triggers the recovery orchestrator, once
//!
//! Readers:
//!     snapshot()/component() → cloned ComponentHealth, never live references
//! ```
//!
//! # Design Decisions
//! - One scheduler task owns all status mutation (single writer)
//! - Timeouts mark failure but never preempt the check's execution
//! - Consecutive-failure thresholds prevent flapping into Failed

pub mod check;
pub mod monitor;
pub mod state;

pub use check::{check_fn, HealthCheck, HealthCheckSpec};
pub use monitor::HealthMonitor;
pub use state::{ComponentHealth, ComponentStatus};
