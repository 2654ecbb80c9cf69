//! Registration endpoint.
//!
//! `POST /register` accepts the browser's multipart form: attendee text
//! fields plus an optional `profilePicture` file.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
};
use registry_core::RegistrationForm;
use serde::Serialize;
use uuid::Uuid;

/// Multipart field carrying the optional profile picture.
pub const PROFILE_PICTURE_FIELD: &str = "profilePicture";

/// Response after registering.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Success message
    pub message: String,
    /// Allocated participation number, four digits
    pub participation_number: String,
    /// Record id, for linking to the detail page
    pub id: Uuid,
}

/// Register a new attendee.
///
/// The form is validated before anything is written. A non-empty
/// `profilePicture` part is stored first so its path lands on the record,
/// and deleted again if the record cannot be created.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3000/register \
///   -F fullName="Jane Doe" \
///   -F emailAddress=jane@example.com \
///   -F type=Press \
///   -F profilePicture=@me.png
/// # {"message":"Media registered successfully","participationNumber":"0001","id":"..."}
/// ```
pub async fn register(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let mut form = RegistrationForm::default();
    let mut picture: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == PROFILE_PICTURE_FIELD {
            let file_name = field.file_name().map(str::to_owned);
            let data = field.bytes().await?;
            // Browsers send an empty part when no file was chosen.
            if !data.is_empty() {
                picture = Some((file_name, data));
            }
            continue;
        }

        let value = field.text().await?;
        if !form.set_field(&name, value) {
            tracing::debug!(field = %name, "Ignoring unknown form field");
        }
    }

    let mut registration = form.validate()?;

    let upload = match picture {
        Some((file_name, data)) => Some(
            state
                .uploads
                .save(file_name.as_deref(), &data)
                .await
                .map_err(|e| AppError::internal("Failed to store profile picture").with_source(e.into()))?,
        ),
        None => None,
    };
    registration.profile_picture = upload.as_ref().map(|stored| stored.public_path.clone());

    let record = match state.registrar.register(registration).await {
        Ok(record) => record,
        Err(e) => {
            if let Some(stored) = &upload {
                state.uploads.discard(stored).await;
            }
            return Err(e.into());
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Media registered successfully".to_string(),
            participation_number: record.participation_number.to_string(),
            id: record.id,
        }),
    ))
}
