//! Confirmation mailers.
//!
//! [`AnyMailer`] picks the transport named by `MAIL_TRANSPORT` at startup.

mod console;
mod smtp;

pub use console::ConsoleMailer;
pub use smtp::SmtpMailer;

use crate::config::{MailConfig, MailTransport};
use registry_core::{ConfirmationMailer, MailError, OutgoingMail};

/// The configured mail transport.
#[derive(Clone)]
pub enum AnyMailer {
    /// Real delivery through an SMTP relay.
    Smtp(SmtpMailer),
    /// Log-only delivery.
    Console(ConsoleMailer),
}

impl AnyMailer {
    /// Builds the mailer selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] if the SMTP sender or relay settings are invalid.
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        match config.transport {
            MailTransport::Console => Ok(Self::Console(ConsoleMailer::new())),
            MailTransport::Smtp => SmtpMailer::new(
                &config.smtp_host,
                config.smtp_port,
                config.smtp_username.clone(),
                config.smtp_password.clone(),
                &config.from_email,
                &config.from_name,
                config.smtp_timeout(),
            )
            .map(Self::Smtp),
        }
    }
}

impl ConfirmationMailer for AnyMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        match self {
            Self::Smtp(mailer) => mailer.send(mail).await,
            Self::Console(mailer) => mailer.send(mail).await,
        }
    }
}
