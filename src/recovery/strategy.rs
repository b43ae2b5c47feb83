//! Recovery strategy capability and attempt records.
//!
//! # Responsibilities
//! - Define the one-method `RecoveryStrategy` capability callers implement
//! - Define the append-only record written for every attempt
//!
//! # Design Decisions
//! - Strategies are synchronous remediation actions (process restarts, cache
//!   clears) executed on the blocking pool
//! - Records are immutable once appended; readers receive clones

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use uuid::Uuid;

use crate::error::BoxError;

/// A named remediation action attempted when a component is unhealthy.
pub trait RecoveryStrategy: Send + Sync {
    /// Strategy identifier used in records and logs.
    fn name(&self) -> &str;

    /// Attempt remediation. `Ok(true)` means the component was healed.
    fn attempt(&self) -> Result<bool, BoxError>;
}

struct FnStrategy<F> {
    name: String,
    f: F,
}

impl<F> RecoveryStrategy for FnStrategy<F>
where
    F: Fn() -> Result<bool, BoxError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn attempt(&self) -> Result<bool, BoxError> {
        (self.f)()
    }
}

/// Wrap a closure as a named [`RecoveryStrategy`].
pub fn strategy_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn RecoveryStrategy>
where
    F: Fn() -> Result<bool, BoxError> + Send + Sync + 'static,
{
    Arc::new(FnStrategy {
        name: name.into(),
        f,
    })
}

/// One recorded recovery attempt. Append-only, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryRecord {
    pub id: Uuid,
    pub component: String,
    pub strategy_index: usize,
    pub strategy: String,
    /// Unix timestamp (seconds) of the attempt.
    pub timestamp: u64,
    pub success: bool,
    /// Error text when the strategy raised instead of returning.
    pub error: Option<String>,
}

impl RecoveryRecord {
    pub(crate) fn new(
        component: &str,
        strategy_index: usize,
        strategy: &str,
        success: bool,
        error: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            component: component.to_string(),
            strategy_index,
            strategy: strategy.to_string(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            success,
            error,
        }
    }
}
