//! Record lookup and check-in endpoints.

use super::parse_record_id;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use registry_core::Registration;

/// List every record, ordered by participation number.
///
/// ```bash
/// curl http://localhost:3000/media
/// ```
pub async fn list_media(State(state): State<AppState>) -> Result<Json<Vec<Registration>>, AppError> {
    Ok(Json(state.registrar.list().await?))
}

/// Get one record by id.
///
/// ```bash
/// curl http://localhost:3000/media/6f1c2a9e-0000-4000-8000-000000000000
/// ```
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Registration>, AppError> {
    let id = parse_record_id(&id)?;
    Ok(Json(state.registrar.find(id).await?))
}

/// Mark the attendee as checked in and return the updated record.
///
/// Repeating the call is harmless.
///
/// ```bash
/// curl -X PUT http://localhost:3000/media/6f1c2a9e-0000-4000-8000-000000000000/register
/// ```
pub async fn register_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Registration>, AppError> {
    let id = parse_record_id(&id)?;
    Ok(Json(state.registrar.check_in(id).await?))
}
