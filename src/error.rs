//! Engine error taxonomy.
//!
//! # Responsibilities
//! - Define the failure vocabulary shared across subsystems
//! - Keep check-level failures internal (they become state transitions)
//! - Surface registry/lifecycle errors synchronously to callers
//!
//! # Design Decisions
//! - Check failures never propagate out of the monitor loop
//! - Strategy errors are recorded per attempt, never aborting later strategies
//! - Unknown-name errors are returned to the caller of the query API

use std::time::Duration;
use thiserror::Error;

/// Boxed error type for caller-supplied operations (checks, strategies, probes).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by the resilience engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A health check exceeded its per-check deadline.
    #[error("health check '{name}' exceeded its {timeout:?} deadline")]
    CheckTimeout { name: String, timeout: Duration },

    /// A health check predicate returned false or raised an error.
    #[error("health check '{name}' failed: {reason}")]
    CheckFailure { name: String, reason: String },

    /// A recovery strategy raised an error while executing.
    #[error("recovery strategy '{strategy}' for component '{component}' failed: {reason}")]
    RecoveryStrategy {
        component: String,
        strategy: String,
        reason: String,
    },

    /// Operation referenced a component name that was never registered.
    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    /// Operation referenced an endpoint name that was never registered.
    #[error("unknown endpoint '{0}'")]
    UnknownEndpoint(String),

    /// `start()` was called while the schedulers are already running.
    #[error("engine is already running")]
    AlreadyRunning,
}
