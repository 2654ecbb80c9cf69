//! HTTP API endpoints.
//!
//! - [`registrations`]: `POST /register`
//! - [`media`]: `GET /media`, `GET /media/:id`, `PUT /media/:id/register`
//! - [`confirmations`]: `POST /send-email`, `POST /media/:id/send-email`
//! - [`deliveries`]: `GET /deliveries/:id`

pub mod confirmations;
pub mod deliveries;
pub mod media;
pub mod registrations;

use crate::error::AppError;
use uuid::Uuid;

/// Parses a record id from the path.
///
/// A malformed id can never name a record, so it is reported as not found.
pub(crate) fn parse_record_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found("Media not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_malformed_id_is_not_found() {
        let err = parse_record_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let id = Uuid::new_v4();
        assert_eq!(parse_record_id(&id.to_string()).unwrap(), id);
    }
}
