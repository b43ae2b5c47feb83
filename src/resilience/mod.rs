//! Resilience primitives.
//!
//! # Data Flow
//! ```text
//! Caller operation (probe, guarded call):
//!     → circuit_breaker.rs (reject fast while Open, count failures,
//!       probe recovery via a single Half-Open trial)
//! ```
//!
//! # Design Decisions
//! - Per-dependency breaker instances (not global)
//! - Fail fast in Open state; no queuing behind a down dependency
//! - Transitions are observable via tracing/metrics but never change the
//!   algorithm

pub mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitError, CircuitState};
