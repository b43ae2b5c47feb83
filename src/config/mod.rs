//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EngineConfig (validated, immutable)
//!     → shared with all subsystems at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the engine is constructed
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    EngineConfig, FailoverConfig, MonitorConfig, ObservabilityConfig, ProactiveConfig,
    RecoveryConfig, ResourceConfig,
};
