//! Record store abstraction.
//!
//! The store is an explicitly constructed handle passed to whoever needs it.
//! Production uses `PostgresRecordStore`; tests use `InMemoryRecordStore`.
//! Implementations assign record ids and enforce uniqueness of participation
//! numbers. They do not allocate numbers themselves (see [`crate::sequence`]).

use crate::registration::{NewRegistration, ParticipationNumber, Registration};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Errors from a record store backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Another record already holds this participation number.
    #[error("participation number {0} is already taken")]
    DuplicateNumber(ParticipationNumber),

    /// Any other backend failure, carrying the backend's message.
    #[error("{0}")]
    Backend(String),
}

/// Persistent collection of registration records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Highest participation number currently stored, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the store cannot be read.
    async fn highest_participation_number(&self) -> Result<Option<ParticipationNumber>, StoreError>;

    /// Persists a new record under `number`, assigning it a fresh id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DuplicateNumber`] if `number` is already used
    /// - [`StoreError::Backend`] for any other failure
    async fn insert(
        &self,
        number: ParticipationNumber,
        registration: NewRegistration,
        created_at: DateTime<Utc>,
    ) -> Result<Registration, StoreError>;

    /// All records, ordered by participation number.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the store cannot be read.
    async fn list(&self) -> Result<Vec<Registration>, StoreError>;

    /// Looks a record up by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the store cannot be read.
    async fn find(&self, id: Uuid) -> Result<Option<Registration>, StoreError>;

    /// Sets the record's register status to `REGISTER` and returns the updated
    /// record. Calling it on an already registered record is a no-op update.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the update fails.
    async fn mark_registered(&self, id: Uuid) -> Result<Option<Registration>, StoreError>;

    /// Cheap connectivity check used by readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the store is unreachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
