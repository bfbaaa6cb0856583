//! Metrics definitions for the LMS service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `lms_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Every label value comes from a fixed set chosen in code:
//! - `outcome`: success, invalid_credentials, rate_limited, error
//! - `action`: allowed, rejected
//! - `cache`: one value per cached listing
//! - `status`: hit, miss, corrupt / success, error
//! - `operation`: store operation names
//! - `path`: route templates, never raw ids

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle that renders
/// `/metrics`.
///
/// # Errors
///
/// Returns an error if bucket configuration is rejected or a recorder is
/// already installed in this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("lms_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Login latency is dominated by bcrypt
        .set_buckets_for_metric(
            Matcher::Full("lms_token_issuance_duration_seconds".to_string()),
            &[0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Authentication Metrics
// ============================================================================

/// Metric: `lms_login_attempts_total`
/// Labels: `outcome`
pub fn record_login_attempt(outcome: &'static str) {
    counter!("lms_login_attempts_total", "outcome" => outcome).increment(1);
}

/// Metric: `lms_token_issuance_duration_seconds`
pub fn record_token_issuance(duration: Duration) {
    histogram!("lms_token_issuance_duration_seconds").record(duration.as_secs_f64());
}

/// Metric: `lms_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &'static str, error_category: Option<&'static str>) {
    let category = error_category.unwrap_or("none");
    counter!(
        "lms_token_validations_total",
        "status" => status,
        "error_category" => category
    )
    .increment(1);
}

// ============================================================================
// Rate Limiting Metrics
// ============================================================================

/// Metric: `lms_rate_limit_decisions_total`
/// Labels: `action` (allowed, rejected)
pub fn record_rate_limit_decision(action: &'static str) {
    counter!("lms_rate_limit_decisions_total", "action" => action).increment(1);
}

// ============================================================================
// Cache and Store Metrics
// ============================================================================

/// Metric: `lms_cache_lookups_total`
/// Labels: `cache`, `status` (hit, miss, corrupt)
pub fn record_cache_lookup(cache: &'static str, status: &'static str) {
    counter!("lms_cache_lookups_total", "cache" => cache, "status" => status).increment(1);
}

/// Metric: `lms_store_errors_total`
/// Labels: `operation`
pub fn record_store_error(operation: &'static str) {
    counter!("lms_store_errors_total", "operation" => operation).increment(1);
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request completion.
///
/// Metric: `lms_http_requests_total`, `lms_http_request_duration_seconds`
/// Labels: `method`, `path`, `status_code`
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let normalized_path = normalize_path(path);

    histogram!("lms_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => normalized_path
    )
    .record(duration.as_secs_f64());

    counter!("lms_http_requests_total",
        "method" => method.to_string(),
        "path" => normalized_path,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Map a request path onto its route template.
fn normalize_path(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        "/api/lms/register" => "/api/lms/register",
        "/api/lms/login" => "/api/lms/login",
        "/api/lms/users" => "/api/lms/users",
        "/api/lms/courses" => "/api/lms/courses",
        "/api/lms/lessons" => "/api/lms/lessons",
        "/api/lms/assignments" => "/api/lms/assignments",
        "/api/lms/submissions" => "/api/lms/submissions",
        _ => match path.strip_prefix("/api/lms/courses/") {
            Some(id) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => {
                "/api/lms/courses/{id}"
            }
            _ => "/other",
        },
    }
}
