//! Structured logging initialization.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for binaries embedding the engine
//! - Respect `RUST_LOG` when present, fall back to the configured level
//!
//! # Design Decisions
//! - Library code only emits `tracing` events; subscriber setup is the
//!   embedder's choice, this helper is for the bundled binary and tests
//! - Idempotent: repeated initialization is a no-op

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with an env-filter.
///
/// `default_level` is used when `RUST_LOG` is not set, scoped to this crate.
pub fn init(default_level: &str) {
    let fallback = format!("resilience_engine={}", default_level);
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&fallback)),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
