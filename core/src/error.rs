//! Registry error taxonomy.
//!
//! Every failure a registry operation can report. The HTTP shell maps these to
//! status codes; nothing here knows about HTTP.

use crate::store::StoreError;
use crate::validation::ValidationError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors surfaced by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No record with the requested id.
    #[error("registration {0} not found")]
    NotFound(Uuid),

    /// Every participation number up to `max` is taken. No record was created.
    #[error("maximum number of participations reached ({max})")]
    CapacityExceeded {
        /// Highest allocatable number.
        max: u16,
    },

    /// Input rejected at the boundary.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// True for a participation-number collision that a fresh allocation may resolve.
    #[must_use]
    pub const fn is_number_collision(&self) -> bool {
        matches!(self, Self::Store(StoreError::DuplicateNumber(_)))
    }
}
