//! Request schemas and boundary validation.
//!
//! Both inbound shapes (the multipart registration form and the JSON
//! confirmation request) deserialize into all-optional structs first so a
//! missing field produces a [`ValidationError`] naming it, rather than an
//! opaque deserializer message.

use crate::confirmation::Confirmation;
use crate::registration::NewRegistration;
use serde::Deserialize;
use thiserror::Error;

/// Boundary validation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("{0} is required")]
    Missing(&'static str),

    /// The value is not a plausible email address.
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    /// The value is not a four-digit participation number in range.
    #[error("invalid participation number: {0:?}")]
    InvalidParticipationNumber(String),
}

/// Registration form as submitted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    /// `fullName`
    pub full_name: Option<String>,
    /// `emailAddress`
    pub email_address: Option<String>,
    /// `phoneNumber`
    pub phone_number: Option<String>,
    /// `type`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// `instagramUsername`
    pub instagram_username: Option<String>,
    /// `day`
    pub day: Option<String>,
    /// `time`
    pub time: Option<String>,
}

impl RegistrationForm {
    /// Assigns a text field by its wire name. Returns `false` for names the
    /// form does not know, which callers ignore.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "fullName" => &mut self.full_name,
            "emailAddress" => &mut self.email_address,
            "phoneNumber" => &mut self.phone_number,
            "type" => &mut self.kind,
            "instagramUsername" => &mut self.instagram_username,
            "day" => &mut self.day,
            "time" => &mut self.time,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Validates the form into storable fields.
    ///
    /// `fullName` and `emailAddress` are required; everything else defaults to
    /// an empty string. All values are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a missing name or a malformed email.
    pub fn validate(self) -> Result<NewRegistration, ValidationError> {
        let full_name = required("fullName", self.full_name)?;
        let email_address = email("emailAddress", self.email_address)?;

        Ok(NewRegistration {
            full_name,
            email_address,
            phone_number: optional(self.phone_number),
            kind: optional(self.kind),
            day: optional(self.day),
            time: optional(self.time),
            instagram_username: optional(self.instagram_username),
            profile_picture: None,
        })
    }
}

/// Body of `POST /send-email`.
///
/// The attendee fields are trusted as given; they are not cross-checked
/// against the store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    /// Recipient address.
    pub email: Option<String>,
    /// Participation number as displayed.
    pub participation_number: Option<String>,
    /// Attendee name.
    pub name: Option<String>,
    /// Attendee phone.
    pub phone: Option<String>,
    /// Attendee category.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Instagram handle.
    pub instagram: Option<String>,
    /// Record status.
    pub status: Option<String>,
    /// Event day.
    pub day: Option<String>,
    /// Event time slot.
    pub time: Option<String>,
}

impl ConfirmationRequest {
    /// Validates the recipient and packages the remaining fields verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `email` is missing or malformed.
    pub fn validate(self) -> Result<Confirmation, ValidationError> {
        Ok(Confirmation {
            to: email("email", self.email)?,
            participation_number: optional(self.participation_number),
            name: optional(self.name),
            phone: optional(self.phone),
            kind: optional(self.kind),
            instagram: optional(self.instagram),
            status: optional(self.status),
            day: optional(self.day),
            time: optional(self.time),
        })
    }
}

fn optional(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let value = optional(value);
    if value.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(value)
}

fn email(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let value = required(field, value)?;
    if is_plausible_email(&value) {
        Ok(value)
    } else {
        Err(ValidationError::InvalidEmail(value))
    }
}

/// `local@domain.tld`: one `@`, no whitespace, non-empty local part, and a
/// domain with an inner dot.
fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
