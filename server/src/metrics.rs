//! Business metrics for the registry.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `registry_registrations_total{outcome}` - Registrations by outcome (created, capacity_exceeded, failed)
//! - `registry_register_checkins_total` - Check-ins recorded
//! - `registry_confirmations_total{outcome}` - Confirmation emails by outcome (delivered, failed)
//! - `registry_uploads_total` - Profile pictures stored
//!
//! ## Histograms
//! - `registry_confirmation_attempts` - Send attempts per confirmation

use crate::state::AppState;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use metrics::{describe_counter, describe_histogram};

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, after the recorder
/// is installed and before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "registry_registrations_total",
        "Total number of registrations by outcome (created, capacity_exceeded, failed)"
    );
    describe_counter!(
        "registry_register_checkins_total",
        "Total number of attendee check-ins"
    );
    describe_counter!(
        "registry_confirmations_total",
        "Total number of confirmation emails by outcome (delivered, failed)"
    );
    describe_histogram!(
        "registry_confirmation_attempts",
        "Send attempts made per confirmation email"
    );
    describe_counter!(
        "registry_uploads_total",
        "Total number of stored profile pictures"
    );
}

/// Prometheus text exposition. Empty when no recorder is installed.
#[allow(clippy::unused_async)]
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(metrics_exporter_prometheus::PrometheusHandle::render)
        .unwrap_or_default();

    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
