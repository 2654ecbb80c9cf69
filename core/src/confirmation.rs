//! Confirmation emails.
//!
//! A [`Confirmation`] is the flat set of attendee fields printed on the
//! emailed document. [`ConfirmationTemplate`] turns one plus the rendered
//! document into an [`OutgoingMail`], which a [`ConfirmationMailer`] delivers.

use crate::registration::Registration;
use std::future::Future;
use thiserror::Error;

/// Attendee fields printed on the confirmation document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Recipient address.
    pub to: String,
    /// Participation number as displayed.
    pub participation_number: String,
    /// Attendee name.
    pub name: String,
    /// Attendee phone.
    pub phone: String,
    /// Attendee category.
    pub kind: String,
    /// Instagram handle.
    pub instagram: String,
    /// Record status.
    pub status: String,
    /// Event day.
    pub day: String,
    /// Event time slot.
    pub time: String,
}

impl Confirmation {
    /// Document body, one line per field, in print order.
    #[must_use]
    pub fn lines(&self) -> [String; 8] {
        [
            format!("Participation Number: {}", self.participation_number),
            format!("Name: {}", self.name),
            format!("Phone: {}", self.phone),
            format!("Type: {}", self.kind),
            format!("Instagram: {}", self.instagram),
            format!("Status: {}", self.status),
            format!("Day: {}", self.day),
            format!("Time: {}", self.time),
        ]
    }
}

impl From<&Registration> for Confirmation {
    fn from(record: &Registration) -> Self {
        Self {
            to: record.email_address.clone(),
            participation_number: record.participation_number.to_string(),
            name: record.full_name.clone(),
            phone: record.phone_number.clone(),
            kind: record.kind.clone(),
            instagram: record.instagram_username.clone(),
            status: record.status.clone(),
            day: record.day.clone(),
            time: record.time.clone(),
        }
    }
}

/// Fixed parts of every confirmation email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationTemplate {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// File name of the attached document.
    pub attachment_name: String,
    /// MIME type of the attached document.
    pub attachment_content_type: String,
}

impl Default for ConfirmationTemplate {
    fn default() -> Self {
        Self {
            subject: "Your Media Details".to_string(),
            body: "Please find attached the details of your media.".to_string(),
            attachment_name: "media-details.pdf".to_string(),
            attachment_content_type: "application/pdf".to_string(),
        }
    }
}

impl ConfirmationTemplate {
    /// Assembles the email for `confirmation` with `document` attached.
    #[must_use]
    pub fn compose(&self, confirmation: &Confirmation, document: Vec<u8>) -> OutgoingMail {
        OutgoingMail {
            to: confirmation.to.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
            attachment_name: self.attachment_name.clone(),
            attachment_content_type: self.attachment_content_type.clone(),
            attachment: document,
        }
    }
}

/// A fully assembled email with one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Attachment file name.
    pub attachment_name: String,
    /// Attachment MIME type.
    pub attachment_content_type: String,
    /// Attachment bytes.
    pub attachment: Vec<u8>,
}

/// Mail delivery failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MailError {
    /// Sender or recipient address rejected before sending.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled.
    #[error("failed to build email: {0}")]
    Build(String),

    /// The relay refused the message or could not be reached.
    #[error("mail relay error: {0}")]
    Relay(String),
}

impl MailError {
    /// Only relay failures can succeed on a later attempt.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Relay(_))
    }
}

/// Delivers confirmation emails through some relay.
///
/// Abstracts over SMTP, console logging in development, and mocks in tests.
pub trait ConfirmationMailer: Send + Sync {
    /// Sends `mail`, resolving once the relay accepted or rejected it.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] if the message is malformed or the relay fails.
    fn send(&self, mail: &OutgoingMail) -> impl Future<Output = Result<(), MailError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Confirmation {
        Confirmation {
            to: "j@example.com".to_string(),
            participation_number: "0001".to_string(),
            name: "Jane Doe".to_string(),
            phone: "555-0100".to_string(),
            kind: "Press".to_string(),
            instagram: "@jane".to_string(),
            status: "pending".to_string(),
            day: "Friday".to_string(),
            time: "18:00".to_string(),
        }
    }

    #[test]
    fn test_lines_follow_print_order() {
        let lines = sample().lines();
        assert_eq!(lines[0], "Participation Number: 0001");
        assert_eq!(lines[1], "Name: Jane Doe");
        assert_eq!(lines[3], "Type: Press");
        assert_eq!(lines[7], "Time: 18:00");
    }

    #[test]
    fn test_compose_uses_template() {
        let mail = ConfirmationTemplate::default().compose(&sample(), b"%PDF".to_vec());
        assert_eq!(mail.to, "j@example.com");
        assert_eq!(mail.subject, "Your Media Details");
        assert_eq!(mail.attachment_name, "media-details.pdf");
        assert_eq!(mail.attachment_content_type, "application/pdf");
        assert_eq!(mail.attachment, b"%PDF");
    }

    #[test]
    fn test_only_relay_errors_are_transient() {
        assert!(MailError::Relay("timeout".to_string()).is_transient());
        assert!(!MailError::InvalidAddress("x".to_string()).is_transient());
        assert!(!MailError::Build("x".to_string()).is_transient());
    }
}
