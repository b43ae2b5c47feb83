//! Process-wide resilience engine.
//!
//! An in-process library combining a health-check scheduler, a circuit
//! breaker primitive, a recovery/self-healing orchestrator, a
//! resource-threshold watchdog and an endpoint-failover manager.
//!
//! # Architecture Overview
//!
//! ```text
//!                ┌──────────────────────────────────────────────────┐
//!                │                 ResilienceEngine                 │
//!                │                                                  │
//!   register     │  ┌────────────┐ tick  ┌─────────────────────┐   │
//!   checks ──────┼─▶│   health   │──────▶│ per-component state │   │
//!                │  │  monitor   │       │ machine (single     │   │
//!                │  └─────┬──────┘       │ writer)             │   │
//!                │        │ Failed       └─────────────────────┘   │
//!                │        ▼                                        │
//!   register     │  ┌────────────┐       ┌─────────────────────┐   │
//!   strategies ──┼─▶│  recovery  │──────▶│ append-only history │   │
//!                │  │orchestrator│       └─────────────────────┘   │
//!                │  └────────────┘  ▲ proactive loop (Degraded)    │
//!                │                                                  │
//!   register     │  ┌────────────┐       ┌─────────────────────┐   │
//!   endpoints ───┼─▶│  failover  │──────▶│ circuit breaker per │   │
//!                │  │  manager   │ probe │ service group       │   │
//!                │  └────────────┘       └─────────────────────┘   │
//!                │                                                  │
//!   thresholds/  │  ┌────────────┐ sample                          │
//!   actions ─────┼─▶│  resource  │──────▶ threshold actions        │
//!                │  │  watcher   │                                  │
//!                │  └────────────┘                                  │
//!                └──────────────────────────────────────────────────┘
//! ```
//!
//! Collaborators register checks, strategies, thresholds and endpoint groups
//! at initialization, then read health snapshots and live addresses while the
//! schedulers run.

// Core subsystems
pub mod config;
pub mod engine;
pub mod error;

// Monitoring and remediation
pub mod failover;
pub mod health;
pub mod recovery;
pub mod resources;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::{load_config, EngineConfig};
pub use engine::{OverallStatus, ResilienceEngine, SystemHealth};
pub use error::{BoxError, EngineError};
pub use failover::{EndpointProber, TcpProber};
pub use health::{check_fn, ComponentHealth, ComponentStatus, HealthCheck, HealthCheckSpec};
pub use recovery::{strategy_fn, RecoveryRecord, RecoveryStrategy};
pub use resilience::{CircuitBreaker, CircuitError, CircuitState};
pub use resources::{ResourceAction, ResourceKind, ResourceSampler, SysinfoSampler};
