//! Resource watchdog subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (watcher.rs):
//!     → sampler.rs reads cpu/memory/disk utilization
//!     → compare against per-kind thresholds
//!     → fire every registered action for exceeded kinds
//! ```
//!
//! # Design Decisions
//! - Sampler is a trait so tests inject fixed values
//! - Actions fire on every over-threshold sample; debouncing is the caller's
//!   concern

pub mod sampler;
pub mod watcher;

pub use sampler::{ResourceKind, ResourceSample, ResourceSampler, SysinfoSampler};
pub use watcher::{ResourceAction, ResourceWatcher};
