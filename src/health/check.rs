//! Health check capability and registration spec.
//!
//! # Responsibilities
//! - Define the one-method `HealthCheck` capability callers implement
//! - Carry per-check scheduling parameters (interval, timeout, retries)
//!
//! # Design Decisions
//! - Checks are synchronous predicates executed on the blocking pool; the
//!   monitor bounds them with a deadline but never preempts them
//! - An error from a check is treated identically to a `false` result

use std::sync::Arc;
use std::time::Duration;

use crate::error::BoxError;

/// A named, periodically-evaluated availability probe.
pub trait HealthCheck: Send + Sync {
    /// Returns `Ok(true)` if the component is available.
    ///
    /// `Ok(false)` and `Err(_)` are both counted as failures.
    fn probe(&self) -> Result<bool, BoxError>;
}

impl<F> HealthCheck for F
where
    F: Fn() -> Result<bool, BoxError> + Send + Sync,
{
    fn probe(&self) -> Result<bool, BoxError> {
        self()
    }
}

/// Wrap an infallible boolean closure as a [`HealthCheck`].
pub fn check_fn<F>(f: F) -> Arc<dyn HealthCheck>
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    Arc::new(move || -> Result<bool, BoxError> { Ok(f()) })
}

/// Registration-time description of a health check.
///
/// Immutable once registered; re-registering under the same name replaces
/// the spec but keeps the component's accumulated health state.
#[derive(Clone)]
pub struct HealthCheckSpec {
    /// Unique component name.
    pub name: String,

    /// The probe operation.
    pub check: Arc<dyn HealthCheck>,

    /// How often the check is due.
    pub interval: Duration,

    /// Hard deadline for one evaluation.
    pub timeout: Duration,

    /// Consecutive failures tolerated before the component is declared Failed.
    pub retry_count: u32,

    /// Marks checks whose failure is operationally critical (logged at error
    /// level rather than warn).
    pub critical: bool,
}

impl HealthCheckSpec {
    pub fn new(
        name: impl Into<String>,
        check: Arc<dyn HealthCheck>,
        interval: Duration,
        timeout: Duration,
        retry_count: u32,
        critical: bool,
    ) -> Self {
        Self {
            name: name.into(),
            check,
            interval,
            timeout,
            retry_count,
            critical,
        }
    }
}

impl std::fmt::Debug for HealthCheckSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthCheckSpec")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("timeout", &self.timeout)
            .field("retry_count", &self.retry_count)
            .field("critical", &self.critical)
            .finish_non_exhaustive()
    }
}
