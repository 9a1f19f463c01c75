//! Metrics definitions for the client application state per ADR-0011.
//!
//! All metrics follow Prometheus naming conventions:
//! - `app_state_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `auth_mode`: 3 values (none, firebase, passcode)
//! - `status`: 4 values (success, error, malformed, abandoned)
//! - `error_type`: bounded by `AuthError` variants
//! - `setting`: 8 values (one per settings field)

use metrics::{counter, histogram};
use std::time::Duration;

/// Record a settled token fetch.
///
/// Metric: `app_state_token_fetch_total`, `app_state_token_fetch_duration_seconds`
/// Labels: `auth_mode`, `status`
pub fn record_token_fetch(auth_mode: &str, status: &str, duration: Duration) {
    histogram!("app_state_token_fetch_duration_seconds",
        "auth_mode" => auth_mode.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("app_state_token_fetch_total",
        "auth_mode" => auth_mode.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a failed token fetch by error type.
///
/// Metric: `app_state_token_fetch_failures_total`
/// Labels: `auth_mode`, `error_type`
pub fn record_token_fetch_failure(auth_mode: &str, error_type: &str) {
    counter!("app_state_token_fetch_failures_total",
        "auth_mode" => auth_mode.to_string(),
        "error_type" => error_type.to_string()
    )
    .increment(1);
}

/// Record a settings dispatch.
///
/// Metric: `app_state_settings_dispatch_total`
/// Labels: `setting`, `status`
pub fn record_settings_dispatch(setting: &str, status: &str) {
    counter!("app_state_settings_dispatch_total",
        "setting" => setting.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
