//! Delivery status endpoint.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use registry_runtime::DeliveryStatus;
use serde::Serialize;
use uuid::Uuid;

/// Delivery status response.
#[derive(Debug, Serialize)]
pub struct DeliveryResponse {
    /// Delivery id
    pub id: Uuid,
    /// Current status, flattened (`status`, `attempt`/`attempts`, `error`)
    #[serde(flatten)]
    pub status: DeliveryStatus,
}

/// Report the status of a confirmation delivery.
///
/// ```bash
/// curl http://localhost:3000/deliveries/0b6c1d1e-0000-4000-8000-000000000000
/// # {"id":"0b6c...","status":"delivered","attempts":1}
/// ```
pub async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeliveryResponse>, AppError> {
    let not_found = || AppError::not_found("Delivery not found");
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    state
        .dispatcher
        .status(id)
        .map(|status| Json(DeliveryResponse { id, status }))
        .ok_or_else(not_found)
}
