//! Metrics definitions for oidc-guard.
//!
//! All metrics follow Prometheus naming conventions:
//! - `guard_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `status`: 2 values (success, error)
//! - `error_type`: bounded by `AuthError`/`TokenError` variants

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded. Token validation is
/// CPU-only, so its buckets sit in the sub-millisecond to tens of
/// milliseconds range.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("guard_token_validation".to_string()),
            &[
                0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.010, 0.025, 0.050,
            ],
        )
        .map_err(|e| format!("Failed to set token validation buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record a JWKS fetch outcome (initial fetch or periodic refresh).
///
/// Metric: `guard_jwks_refresh_total`
/// Labels: `status`
pub fn record_jwks_refresh(status: &'static str) {
    counter!("guard_jwks_refresh_total", "status" => status).increment(1);
}

/// Record the number of keys in the currently published key set.
///
/// Metric: `guard_jwks_keys`
pub fn set_jwks_key_count(count: usize) {
    gauge!("guard_jwks_keys").set(count as f64);
}

/// Record a bearer token validation outcome.
///
/// Metric: `guard_token_validations_total`, `guard_token_validation_duration_seconds`
/// Labels: `status`, `error_type`
///
/// Validation never performs I/O, so the duration measures signature
/// verification plus claim decoding only.
pub fn record_token_validation(status: &'static str, error_type: &'static str, duration: Duration) {
    histogram!("guard_token_validation_duration_seconds", "status" => status)
        .record(duration.as_secs_f64());

    counter!("guard_token_validations_total",
        "status" => status,
        "error_type" => error_type
    )
    .increment(1);
}
