//! In-memory record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use registry_core::{
    NewRegistration, ParticipationNumber, RecordStore, RegisterStatus, Registration, StoreError,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory record store for fast, deterministic tests.
///
/// Enforces participation-number uniqueness like the database constraint.
/// [`set_unavailable`](Self::set_unavailable) makes every call fail with
/// [`StoreError::Backend`], to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Vec<Registration>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record directly, bypassing allocation.
    ///
    /// # Panics
    ///
    /// Panics if `number` is already used.
    #[allow(clippy::expect_used)]
    pub async fn seed(&self, number: ParticipationNumber, registration: NewRegistration) -> Registration {
        self.insert_record(number, registration, DateTime::<Utc>::UNIX_EPOCH)
            .await
            .expect("seeded participation number should be free")
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Snapshot of every record in insertion order.
    pub async fn records(&self) -> Vec<Registration> {
        self.records.read().await.clone()
    }

    /// Toggles simulated backend outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Backend("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    async fn insert_record(
        &self,
        number: ParticipationNumber,
        registration: NewRegistration,
        created_at: DateTime<Utc>,
    ) -> Result<Registration, StoreError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.participation_number == number) {
            return Err(StoreError::DuplicateNumber(number));
        }
        let record = Registration::create(Uuid::new_v4(), number, registration, created_at);
        records.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn highest_participation_number(&self) -> Result<Option<ParticipationNumber>, StoreError> {
        self.check_available()?;
        Ok(self
            .records
            .read()
            .await
            .iter()
            .map(|r| r.participation_number)
            .max())
    }

    async fn insert(
        &self,
        number: ParticipationNumber,
        registration: NewRegistration,
        created_at: DateTime<Utc>,
    ) -> Result<Registration, StoreError> {
        self.check_available()?;
        self.insert_record(number, registration, created_at).await
    }

    async fn list(&self) -> Result<Vec<Registration>, StoreError> {
        self.check_available()?;
        let mut records = self.records.read().await.clone();
        records.sort_by_key(|r| r.participation_number);
        Ok(records)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Registration>, StoreError> {
        self.check_available()?;
        Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn mark_registered(&self, id: Uuid) -> Result<Option<Registration>, StoreError> {
        self.check_available()?;
        let mut records = self.records.write().await;
        Ok(records.iter_mut().find(|r| r.id == id).map(|record| {
            record.register_status = RegisterStatus::Registered;
            record.clone()
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_number_is_rejected() {
        let store = InMemoryRecordStore::new();
        store.seed(ParticipationNumber::FIRST, NewRegistration::default()).await;

        let err = store
            .insert(ParticipationNumber::FIRST, NewRegistration::default(), Utc::now())
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::DuplicateNumber(ParticipationNumber::FIRST));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_number() {
        let store = InMemoryRecordStore::new();
        store.seed(ParticipationNumber::new(7).unwrap(), NewRegistration::default()).await;
        store.seed(ParticipationNumber::new(2).unwrap(), NewRegistration::default()).await;

        let numbers: Vec<u16> = store.list().await.unwrap().iter().map(|r| r.participation_number.value()).collect();
        assert_eq!(numbers, [2, 7]);
        assert_eq!(
            store.highest_participation_number().await.unwrap(),
            ParticipationNumber::new(7)
        );
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = InMemoryRecordStore::new();
        store.set_unavailable(true);

        assert!(matches!(store.ping().await, Err(StoreError::Backend(_))));
        assert!(store.list().await.is_err());

        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }
}
