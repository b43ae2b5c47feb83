//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Construct engine → Register checks/strategies
//!     → start() spawns scheduler tasks
//!
//! Shutdown:
//!     stop() → broadcast signal → each scheduler finishes its current tick
//!     → bounded join (tasks past the deadline are aborted)
//! ```
//!
//! # Design Decisions
//! - Schedulers are owned tasks, not detached daemon threads
//! - stop() is idempotent and bounded by a per-task deadline
//! - In-flight blocking check executions are never forcibly terminated

pub mod shutdown;

pub use shutdown::{Shutdown, TaskSet};
