//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges via the metrics facade)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Whatever metrics recorder the embedding process installs
//! ```
//!
//! # Design Decisions
//! - The engine is an in-process library; it never binds an exporter itself
//! - State transitions are logged where they happen, not via a side channel

pub mod logging;
pub mod metrics;
