//! Confirmation document rendering.

use crate::confirmation::Confirmation;
use thiserror::Error;

/// Rendering failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render document: {0}")]
pub struct DocumentError(pub String);

/// Renders a [`Confirmation`] into the bytes of an attachable document.
pub trait DocumentRenderer: Send + Sync {
    /// Renders `confirmation`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the backend fails to lay out or encode the document.
    fn render(&self, confirmation: &Confirmation) -> Result<Vec<u8>, DocumentError>;
}
