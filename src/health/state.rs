//! Component health state machine.
//!
//! # States
//! - Healthy: checks passing
//! - Degraded: failing, but below the consecutive-failure threshold
//! - Failed: threshold reached, recovery has been triggered
//! - Recovering: a check passed again after Failed (or healing succeeded)
//!
//! # State Transitions
//! ```text
//! success & Failed     → Recovering
//! success & Recovering → Healthy (failure counter reset)
//! success & Healthy/Degraded → unchanged (counter NOT reset, see below)
//! failure → counter += 1; counter ≥ retry_count → Failed, else Degraded
//! ```
//!
//! # Design Decisions
//! - A success while Degraded intentionally does not reset the counter, so a
//!   single later failure can re-reach the threshold. Preserved as observed
//!   behavior; flagged for stakeholder confirmation before changing.
//! - Status is mutated only by the monitor loop (single writer); readers get
//!   cloned snapshots.

use serde::Serialize;

/// Component availability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Failed,
    Recovering,
}

impl std::fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComponentStatus::Healthy => "healthy",
            ComponentStatus::Degraded => "degraded",
            ComponentStatus::Failed => "failed",
            ComponentStatus::Recovering => "recovering",
        };
        f.write_str(s)
    }
}

/// Outcome of applying a failed evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureTransition {
    /// Threshold reached for the first time this episode; recovery fires once.
    BecameFailed,
    /// Below threshold; component is degraded.
    Degraded,
    /// Already Failed; no new recovery trigger.
    StillFailed,
}

/// Snapshot of one component's health.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: ComponentStatus,
    pub consecutive_failures: u32,
    /// Unix timestamp (seconds) of the last evaluation, if any.
    pub last_check: Option<u64>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ComponentStatus::Healthy,
            consecutive_failures: 0,
            last_check: None,
        }
    }

    /// Apply a successful evaluation.
    pub fn apply_success(&mut self) {
        match self.status {
            ComponentStatus::Failed => {
                self.status = ComponentStatus::Recovering;
            }
            ComponentStatus::Recovering => {
                self.status = ComponentStatus::Healthy;
                self.consecutive_failures = 0;
            }
            // Counter deliberately left untouched here.
            ComponentStatus::Healthy | ComponentStatus::Degraded => {}
        }
    }

    /// Apply a failed evaluation.
    pub fn apply_failure(&mut self, retry_count: u32) -> FailureTransition {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= retry_count {
            if self.status != ComponentStatus::Failed {
                self.status = ComponentStatus::Failed;
                FailureTransition::BecameFailed
            } else {
                FailureTransition::StillFailed
            }
        } else {
            self.status = ComponentStatus::Degraded;
            FailureTransition::Degraded
        }
    }
}
