//! Metrics collection.
//!
//! # Metrics
//! - `engine_component_health` (gauge): 1=passing, 0=failing, per component
//! - `engine_check_failures_total` (counter): failed evaluations by component
//! - `engine_circuit_transitions_total` (counter): breaker transitions by name/state
//! - `engine_recovery_attempts_total` (counter): strategy attempts by outcome
//! - `engine_resource_utilization_pct` (gauge): last sampled value per kind
//! - `engine_threshold_breaches_total` (counter): over-threshold samples per kind
//!
//! # Design Decisions
//! - Uses the `metrics` facade only; the embedding process installs the
//!   recorder/exporter of its choice
//! - Low-overhead updates, safe to call from scheduler hot loops

use metrics::{counter, gauge};

/// Record the outcome of a single health check evaluation.
pub fn record_check_result(component: &str, passed: bool) {
    gauge!("engine_component_health", "component" => component.to_string())
        .set(if passed { 1.0 } else { 0.0 });
    if !passed {
        counter!("engine_check_failures_total", "component" => component.to_string()).increment(1);
    }
}

/// Record a circuit breaker state transition.
pub fn record_circuit_transition(name: &str, to: &str) {
    counter!(
        "engine_circuit_transitions_total",
        "breaker" => name.to_string(),
        "to" => to.to_string()
    )
    .increment(1);
}

/// Record a recovery strategy attempt.
pub fn record_recovery_attempt(component: &str, success: bool) {
    counter!(
        "engine_recovery_attempts_total",
        "component" => component.to_string(),
        "success" => success.to_string()
    )
    .increment(1);
}

/// Record a resource utilization sample.
pub fn record_resource_sample(kind: &str, value: f64) {
    gauge!("engine_resource_utilization_pct", "kind" => kind.to_string()).set(value);
}

/// Record an over-threshold resource sample.
pub fn record_threshold_breach(kind: &str) {
    counter!("engine_threshold_breaches_total", "kind" => kind.to_string()).increment(1);
}
