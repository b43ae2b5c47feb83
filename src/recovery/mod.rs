//! Recovery / self-healing subsystem.
//!
//! # Data Flow
//! ```text
//! Reactive path:
//!     HealthMonitor detects Failed transition
//!     → orchestrator.rs execute_healing (in-order, first success wins)
//!     → strategy.rs records every attempt
//!
//! Proactive path:
//!     Independent loop scans health snapshots
//!     → execute_healing for every Degraded component
//! ```
//!
//! # Design Decisions
//! - Ordering, first-success-wins, and durable recording are the whole
//!   contract; strategies may have arbitrary external effects
//! - History is in-memory only; persistence across restarts is out of scope

pub mod orchestrator;
pub mod strategy;

pub use orchestrator::{run_proactive, RecoveryOrchestrator};
pub use strategy::{strategy_fn, RecoveryRecord, RecoveryStrategy};
