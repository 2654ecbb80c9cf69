//! Participation-number allocation.
//!
//! Reads the current maximum from the store and computes its successor. The
//! read and the subsequent insert are separate round trips, so two concurrent
//! callers can compute the same number; the store's uniqueness constraint
//! rejects the loser with [`StoreError::DuplicateNumber`](crate::StoreError)
//! and the caller is expected to allocate again.

use crate::registration::ParticipationNumber;
use crate::store::RecordStore;

/// Computes the next participation number.
///
/// # Errors
///
/// - [`RegistryError::CapacityExceeded`](crate::RegistryError) once `9000` is taken
/// - [`RegistryError::Store`](crate::RegistryError) if the maximum cannot be read
pub async fn next_participation_number(
    store: &dyn RecordStore,
) -> crate::Result<ParticipationNumber> {
    let last = store.highest_participation_number().await?;
    ParticipationNumber::after(last)
}
