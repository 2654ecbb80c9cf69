//! Confirmation email endpoints.
//!
//! Both endpoints queue a delivery and wait a bounded time for its outcome.
//! The answer is plain text:
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | delivered | 200 | `Email sent successfully` |
//! | failed | 500 | `Error sending email` |
//! | still running | 202 | `Email delivery pending` |
//!
//! Every answer carries the delivery id in `X-Delivery-Id`, which
//! `GET /deliveries/:id` resolves. Neither endpoint writes to the record store.

use super::parse_record_id;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use registry_core::{Confirmation, ConfirmationRequest};
use registry_runtime::DeliveryStatus;

/// Response header carrying the delivery id.
pub const DELIVERY_ID_HEADER: &str = "x-delivery-id";

/// Email a confirmation PDF built from the request body.
///
/// ```bash
/// curl -X POST http://localhost:3000/send-email \
///   -H "Content-Type: application/json" \
///   -d '{"email":"jane@example.com","participationNumber":"0001","name":"Jane Doe"}'
/// ```
pub async fn send_confirmation(
    State(state): State<AppState>,
    Json(request): Json<ConfirmationRequest>,
) -> Result<Response, AppError> {
    let confirmation = request.validate()?;
    deliver(&state, confirmation).await
}

/// Email a confirmation PDF built from the stored record.
///
/// ```bash
/// curl -X POST http://localhost:3000/media/6f1c2a9e-0000-4000-8000-000000000000/send-email
/// ```
pub async fn send_record_confirmation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_record_id(&id)?;
    let record = state.registrar.find(id).await?;
    deliver(&state, Confirmation::from(&record)).await
}

async fn deliver(state: &AppState, confirmation: Confirmation) -> Result<Response, AppError> {
    let ticket = match state.dispatcher.submit(confirmation).await {
        Ok(ticket) => ticket,
        Err(e) => {
            tracing::error!(error = %e, "Failed to queue confirmation");
            return Ok((StatusCode::INTERNAL_SERVER_ERROR, "Error sending email").into_response());
        }
    };
    let id = ticket.id;

    let (status, body) = match ticket.wait(state.mail_response_timeout).await {
        Some(DeliveryStatus::Delivered { .. }) => (StatusCode::OK, "Email sent successfully"),
        Some(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error sending email"),
        None => {
            tracing::info!(delivery_id = %id, "Confirmation still in flight, answering 202");
            (StatusCode::ACCEPTED, "Email delivery pending")
        }
    };

    Ok((status, [(DELIVERY_ID_HEADER, id.to_string())], body).into_response())
}
