//! Circuit breaker for failing-dependency protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: testing if the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count reaches fail_max
//! Open → Half-Open: after reset_timeout elapses, next call is the trial
//! Half-Open → Closed: trial call succeeds (failure_count reset)
//! Half-Open → Open: trial call fails (opened_at reset)
//! ```
//!
//! # Design Decisions
//! - Fail fast in Open state without invoking the wrapped operation
//! - Exactly one trial invocation in Half-Open; concurrent callers during the
//!   trial are rejected as if the circuit were still Open
//! - State lock is never held while the wrapped operation runs

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::error::BoxError;
use crate::observability::metrics;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, calls pass through.
    Closed,
    /// Circuit tripped, calls fail fast.
    Open,
    /// Cooldown elapsed, a single trial call is allowed.
    HalfOpen,
}

impl CircuitState {
    fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        }
    }
}

/// Error returned by [`CircuitBreaker::call`].
#[derive(Debug, Error)]
pub enum CircuitError {
    /// The circuit is open; the wrapped operation was not invoked.
    #[error("circuit breaker '{0}' is open")]
    Rejected(String),

    /// The wrapped operation ran and failed.
    #[error("operation failed: {0}")]
    Operation(BoxError),
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

/// A named circuit breaker guarding one downstream dependency.
///
/// Safe to share between concurrent callers; state transitions are atomic.
pub struct CircuitBreaker {
    name: String,
    fail_max: u32,
    reset_timeout: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, fail_max: u32, reset_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            fail_max,
            reset_timeout,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().unwrap().state
    }

    pub fn failure_count(&self) -> u32 {
        self.inner.lock().unwrap().failure_count
    }

    /// Invoke `op` under breaker protection.
    ///
    /// While Open (and before `reset_timeout` elapses) the call is rejected
    /// without invoking `op`. Once the cooldown has elapsed the next caller
    /// becomes the Half-Open trial.
    pub async fn call<T, F, Fut>(&self, op: F) -> Result<T, CircuitError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, BoxError>>,
    {
        let is_trial = {
            let mut inner = self.inner.lock().unwrap();
            match inner.state {
                CircuitState::Closed => false,
                CircuitState::Open => {
                    let elapsed = inner
                        .opened_at
                        .map(|at| at.elapsed())
                        .unwrap_or(Duration::MAX);
                    if elapsed < self.reset_timeout {
                        return Err(CircuitError::Rejected(self.name.clone()));
                    }
                    self.transition(&mut inner, CircuitState::HalfOpen);
                    inner.trial_in_flight = true;
                    true
                }
                CircuitState::HalfOpen => {
                    if inner.trial_in_flight {
                        return Err(CircuitError::Rejected(self.name.clone()));
                    }
                    inner.trial_in_flight = true;
                    true
                }
            }
        };

        let result = op().await;

        let mut inner = self.inner.lock().unwrap();
        if is_trial {
            inner.trial_in_flight = false;
        }
        match result {
            Ok(value) => {
                inner.failure_count = 0;
                inner.opened_at = None;
                if inner.state != CircuitState::Closed {
                    self.transition(&mut inner, CircuitState::Closed);
                }
                Ok(value)
            }
            Err(err) => {
                inner.failure_count += 1;
                if inner.state == CircuitState::HalfOpen {
                    // Failed trial reopens immediately.
                    inner.opened_at = Some(Instant::now());
                    self.transition(&mut inner, CircuitState::Open);
                } else if inner.state == CircuitState::Closed
                    && inner.failure_count >= self.fail_max
                {
                    inner.opened_at = Some(Instant::now());
                    self.transition(&mut inner, CircuitState::Open);
                }
                Err(CircuitError::Operation(err))
            }
        }
    }

    fn transition(&self, inner: &mut Inner, to: CircuitState) {
        let from = inner.state;
        inner.state = to;
        metrics::record_circuit_transition(&self.name, to.as_str());
        match to {
            CircuitState::Open => tracing::warn!(
                breaker = %self.name,
                from = from.as_str(),
                failures = inner.failure_count,
                "Circuit breaker opened"
            ),
            CircuitState::HalfOpen => tracing::info!(
                breaker = %self.name,
                "Circuit breaker entering half-open state"
            ),
            CircuitState::Closed => tracing::info!(
                breaker = %self.name,
                "Circuit breaker closed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn failing() -> impl Future<Output = Result<(), BoxError>> {
        async { Err::<(), BoxError>("boom".into()) }
    }

    fn passing() -> impl Future<Output = Result<(), BoxError>> {
        async { Ok(()) }
    }

    #[tokio::test]
    async fn closed_passes_through() {
        let breaker = CircuitBreaker::new("test", 5, Duration::from_secs(60));
        assert!(breaker.call(|| passing()).await.is_ok());
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.failure_count(), 0);
    }

    #[tokio::test]
    async fn opens_exactly_on_fail_max() {
        let breaker = CircuitBreaker::new("test", 5, Duration::from_secs(60));
        for _ in 0..4 {
            let _ = breaker.call(|| failing()).await;
        }
        assert_eq!(breaker.state(), CircuitState::Closed);

        let _ = breaker.call(|| failing()).await;
        assert_eq!(breaker.state(), CircuitState::Open);
        assert_eq!(breaker.failure_count(), 5);
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let breaker = CircuitBreaker::new("test", 5, Duration::from_secs(60));
        for _ in 0..4 {
            let _ = breaker.call(|| failing()).await;
        }
        assert_eq!(breaker.failure_count(), 4);

        breaker.call(|| passing()).await.unwrap();
        assert_eq!(breaker.failure_count(), 0);
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn open_rejects_without_invoking() {
        let breaker = CircuitBreaker::new("test", 1, Duration::from_secs(60));
        let _ = breaker.call(|| failing()).await;
        assert_eq!(breaker.state(), CircuitState::Open);

        let invoked = Arc::new(AtomicU32::new(0));
        let counter = invoked.clone();
        let result = breaker
            .call(|| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), BoxError>(())
            })
            .await;

        assert!(matches!(result, Err(CircuitError::Rejected(_))));
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_trial_success_closes() {
        let breaker = CircuitBreaker::new("test", 1, Duration::from_secs(60));
        let _ = breaker.call(|| failing()).await;
        assert_eq!(breaker.state(), CircuitState::Open);

        tokio::time::advance(Duration::from_secs(61)).await;

        breaker.call(|| passing()).await.unwrap();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.failure_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_trial_failure_reopens() {
        let breaker = CircuitBreaker::new("test", 1, Duration::from_secs(60));
        let _ = breaker.call(|| failing()).await;

        tokio::time::advance(Duration::from_secs(61)).await;

        let result = breaker.call(|| failing()).await;
        assert!(matches!(result, Err(CircuitError::Operation(_))));
        assert_eq!(breaker.state(), CircuitState::Open);

        // opened_at was reset, so the very next call is rejected again.
        let result = breaker.call(|| passing()).await;
        assert!(matches!(result, Err(CircuitError::Rejected(_))));
    }
}
