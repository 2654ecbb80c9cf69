//! Mailer and renderer doubles.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use registry_core::{
    Confirmation, ConfirmationMailer, DocumentError, DocumentRenderer, MailError, OutgoingMail,
};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Mock mailer.
///
/// Records every accepted message. Can be told to fail its first `n`
/// attempts with a transient relay error, or every attempt. A gated mailer
/// holds each send until [`release`](Self::release) lets it through.
#[derive(Debug, Clone, Default)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
    attempts: Arc<AtomicUsize>,
    failures_left: Arc<AtomicUsize>,
    gate: Option<Arc<Semaphore>>,
}

impl MockMailer {
    /// Create a mailer that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mailer whose first `failures` attempts fail with [`MailError::Relay`].
    #[must_use]
    pub fn failing_times(failures: usize) -> Self {
        let mailer = Self::default();
        mailer.failures_left.store(failures, Ordering::SeqCst);
        mailer
    }

    /// Create a mailer whose relay is never reachable.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::failing_times(usize::MAX)
    }

    /// Create a mailer whose sends block until released.
    #[must_use]
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    /// Lets `sends` blocked or future sends through a gated mailer.
    pub fn release(&self, sends: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(sends);
        }
    }

    /// Messages accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Send attempts made so far, including failed ones.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ConfirmationMailer for MockMailer {
    fn send(&self, mail: &OutgoingMail) -> impl Future<Output = Result<(), MailError>> + Send {
        let sent = Arc::clone(&self.sent);
        let attempts = Arc::clone(&self.attempts);
        let failures_left = Arc::clone(&self.failures_left);
        let gate = self.gate.clone();
        let mail = mail.clone();

        async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = gate {
                gate.acquire().await.unwrap().forget();
            }
            let failing = failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok();
            if failing {
                return Err(MailError::Relay("connection refused".to_string()));
            }
            sent.lock().unwrap().push(mail);
            Ok(())
        }
    }
}

/// Renderer returning fixed bytes, or always failing.
#[derive(Debug, Clone)]
pub struct StaticRenderer {
    document: Option<Vec<u8>>,
}

impl StaticRenderer {
    /// Create a renderer that returns `document` for every confirmation.
    #[must_use]
    pub fn new(document: impl Into<Vec<u8>>) -> Self {
        Self {
            document: Some(document.into()),
        }
    }

    /// Create a renderer that always fails.
    #[must_use]
    pub const fn failing() -> Self {
        Self { document: None }
    }
}

impl DocumentRenderer for StaticRenderer {
    fn render(&self, _confirmation: &Confirmation) -> Result<Vec<u8>, DocumentError> {
        self.document
            .clone()
            .ok_or_else(|| DocumentError("renderer unavailable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            to: "j@example.com".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
            attachment_name: "a.pdf".to_string(),
            attachment_content_type: "application/pdf".to_string(),
            attachment: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_failing_times_then_succeeds() {
        let mailer = MockMailer::failing_times(1);

        assert!(mailer.send(&mail()).await.is_err());
        assert!(mailer.send(&mail()).await.is_ok());
        assert_eq!(mailer.attempts(), 2);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_gated_send_waits_for_release() {
        let mailer = MockMailer::gated();
        let pending = tokio::spawn({
            let mailer = mailer.clone();
            async move { mailer.send(&mail()).await }
        });

        tokio::task::yield_now().await;
        assert!(mailer.sent().is_empty());

        mailer.release(1);
        assert!(pending.await.unwrap().is_ok());
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_never_sends() {
        let mailer = MockMailer::unreachable();
        for _ in 0..3 {
            assert!(matches!(mailer.send(&mail()).await, Err(MailError::Relay(_))));
        }
        assert!(mailer.sent().is_empty());
    }
}
