//! Router configuration for the registry server.
//!
//! Builds the complete Axum router with all endpoints.

use crate::api::{confirmations, deliveries, media, registrations};
use crate::health::{health_check, readiness_check};
use crate::metrics::render_metrics;
use crate::state::AppState;
use crate::upload::PUBLIC_PREFIX;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Build the complete Axum router.
///
/// Configures all routes including:
/// - Registration (multipart, with the upload body limit)
/// - Record listing, lookup and check-in
/// - Confirmation emails and delivery status
/// - Health, readiness and metrics
/// - Stored uploads under `/uploads`
/// - The browser client, with `/` serving `login.html`
///
/// Every response carries an `x-request-id` header.
pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.uploads.max_bytes());
    let uploads = ServeDir::new(state.uploads.dir());
    let client = ServeDir::new(&state.client_dir);
    let login = ServeFile::new(state.client_dir.join("login.html"));

    Router::new()
        // Registration
        .route("/register", post(registrations::register).layer(body_limit))
        // Records
        .route("/media", get(media::list_media))
        .route("/media/:id", get(media::get_media))
        .route("/media/:id/register", put(media::register_attendance))
        // Confirmation emails
        .route("/media/:id/send-email", post(confirmations::send_record_confirmation))
        .route("/send-email", post(confirmations::send_confirmation))
        .route("/deliveries/:id", get(deliveries::get_delivery))
        // Operations
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(render_metrics))
        // Static content
        .route_service("/", login)
        .nest_service(&format!("/{PUBLIC_PREFIX}"), uploads)
        .fallback_service(client)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::UploadStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use registry_runtime::{DispatchSettings, EmailDispatcher, Registrar};
    use registry_testing::{InMemoryRecordStore, MockMailer, StaticRenderer, test_clock};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(dir: &std::path::Path, max_bytes: usize) -> Router {
        let clock = Arc::new(test_clock());
        let registrar = Registrar::new(Arc::new(InMemoryRecordStore::new()), clock.clone());
        let (dispatcher, _worker) = EmailDispatcher::spawn(
            Arc::new(MockMailer::new()),
            Arc::new(StaticRenderer::new(b"%PDF-".to_vec())),
            DispatchSettings::default(),
        );
        let state = AppState::new(
            registrar,
            dispatcher,
            UploadStore::new(dir, clock, max_bytes),
            dir,
        );
        build_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = tempfile::tempdir().unwrap();

        let response = app(dir.path(), 1024)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_register_body_limit() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "--X\r\nContent-Disposition: form-data; name=\"fullName\"\r\n\r\n{}\r\n--X--\r\n",
            "a".repeat(900)
        );

        let response = app(dir.path(), 16)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/register")
                    .header(header::CONTENT_TYPE, "multipart/form-data; boundary=X")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_unknown_method_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let response = app(dir.path(), 1024)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/media")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
