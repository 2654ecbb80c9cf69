//! SMTP mailer implementation using Lettre.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use registry_core::{ConfirmationMailer, MailError, OutgoingMail};
use std::time::Duration;

/// SMTP mailer using Lettre.
///
/// Connects over implicit TLS to the relay (port 465 by default) and
/// authenticates with the configured credentials. Connection and command
/// timeouts are bounded so an unreachable relay fails instead of hanging.
///
/// # Examples
///
/// ```ignore
/// use registry_server::mail::SmtpMailer;
///
/// let mailer = SmtpMailer::new(
///     "smtp.gmail.com",
///     465,
///     "user@gmail.com".to_string(),
///     "app_password".to_string(),
///     "info@example.com",
///     "Example Events",
///     Duration::from_secs(20),
/// )?;
/// ```
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create a new SMTP mailer.
    ///
    /// # Errors
    ///
    /// - [`MailError::InvalidAddress`] if the sender address does not parse
    /// - [`MailError::Relay`] if the relay host is unusable for TLS
    pub fn new(
        smtp_host: &str,
        smtp_port: u16,
        smtp_username: String,
        smtp_password: String,
        from_email: &str,
        from_name: &str,
        timeout: Duration,
    ) -> Result<Self, MailError> {
        let from = format!("{from_name} <{from_email}>")
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidAddress(format!("Invalid from address: {e}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
            .map_err(|e| MailError::Relay(format!("SMTP relay error: {e}")))?
            .port(smtp_port)
            .credentials(Credentials::new(smtp_username, smtp_password))
            .timeout(Some(timeout))
            .build();

        Ok(Self { transport, from })
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message, MailError> {
        let to = mail
            .to
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidAddress(format!("Invalid to address: {e}")))?;
        let content_type = ContentType::parse(&mail.attachment_content_type)
            .map_err(|e| MailError::Build(format!("Invalid attachment content type: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject.clone())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(mail.body.clone()))
                    .singlepart(
                        Attachment::new(mail.attachment_name.clone())
                            .body(mail.attachment.clone(), content_type),
                    ),
            )
            .map_err(|e| MailError::Build(format!("Failed to build email: {e}")))
    }
}

impl ConfirmationMailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = self.build_message(mail)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Relay(format!("Failed to send email: {e}")))?;

        tracing::debug!(to = %mail.to, "Relay accepted confirmation email");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_core::ConfirmationTemplate;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(
            "smtp.example.com",
            465,
            "user".to_string(),
            "pass".to_string(),
            "info@example.com",
            "Example Events",
            Duration::from_secs(1),
        )
        .unwrap()
    }

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            to: to.to_string(),
            ..ConfirmationTemplate::default().compose(
                &registry_core::Confirmation {
                    to: to.to_string(),
                    participation_number: "0001".to_string(),
                    name: "Jane Doe".to_string(),
                    phone: String::new(),
                    kind: String::new(),
                    instagram: String::new(),
                    status: "pending".to_string(),
                    day: String::new(),
                    time: String::new(),
                },
                b"%PDF-1.3".to_vec(),
            )
        }
    }

    #[test]
    fn test_message_carries_attachment() {
        let message = mailer().build_message(&mail("j@example.com")).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("Subject: Your Media Details"));
        assert!(raw.contains("media-details.pdf"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("Please find attached the details of your media."));
    }

    #[test]
    fn test_bad_recipient_is_not_transient() {
        let err = mailer().build_message(&mail("not an address")).unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_bad_sender_is_rejected() {
        let result = SmtpMailer::new(
            "smtp.example.com",
            465,
            String::new(),
            String::new(),
            "not-an-address",
            "Example",
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(MailError::InvalidAddress(_))));
    }
}
