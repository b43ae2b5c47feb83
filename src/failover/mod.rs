//! Endpoint failover subsystem.
//!
//! # Data Flow
//! ```text
//! Caller needs a live address:
//!     endpoint(name) → current address
//!
//! Caller verifies connectivity:
//!     check_endpoint(name)
//!     → prober.rs probe through the group's circuit breaker
//!     → on failure/rejection: manager.rs rotates current
//! ```
//!
//! # Design Decisions
//! - Per-service breaker keeps one flapping service from starving others
//! - Rotation order is fixed and cyclic; no scoring or weighting

pub mod manager;
pub mod prober;

pub use manager::EndpointFailover;
pub use prober::{EndpointProber, TcpProber};
