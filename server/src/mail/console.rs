//! Console mailer for development and testing.

use registry_core::{ConfirmationMailer, MailError, OutgoingMail};
use tracing::info;

/// Console mailer.
///
/// Logs confirmation emails instead of sending them. Selected with
/// `MAIL_TRANSPORT=console`, the default, so a fresh checkout runs without
/// relay credentials.
#[derive(Clone, Debug, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    /// Create a new console mailer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ConfirmationMailer for ConsoleMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        info!(
            to = %mail.to,
            subject = %mail.subject,
            attachment = %mail.attachment_name,
            attachment_bytes = mail.attachment.len(),
            "📧 Confirmation Email (Development Mode)"
        );
        Ok(())
    }
}
