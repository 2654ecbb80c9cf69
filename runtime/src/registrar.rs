//! Registration workflow.
//!
//! [`Registrar`] sequences the store operations behind each endpoint:
//! allocate a number and insert, list, look up, and check in. It owns no
//! state beyond the injected store handle and clock.

use crate::retry::{RetryPolicy, retry_with_predicate};
use registry_core::sequence::next_participation_number;
use registry_core::{Clock, NewRegistration, RecordStore, Registration, RegistryError, Result};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Default policy for re-allocating after a participation-number collision.
#[must_use]
pub const fn default_allocation_retry() -> RetryPolicy {
    RetryPolicy::builder()
        .max_retries(4)
        .initial_delay(Duration::from_millis(10))
        .max_delay(Duration::from_millis(200))
        .multiplier(2.0)
        .build()
}

/// Runs registry operations against a record store.
#[derive(Clone)]
pub struct Registrar {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    allocation_retry: RetryPolicy,
}

impl Registrar {
    /// Creates a registrar over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            allocation_retry: default_allocation_retry(),
        }
    }

    /// Overrides the collision retry policy.
    #[must_use]
    pub fn with_allocation_retry(mut self, policy: RetryPolicy) -> Self {
        self.allocation_retry = policy;
        self
    }

    /// The underlying store handle.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Allocates the next participation number and stores a new record under it.
    ///
    /// A concurrent registration can claim the same number between the read
    /// and the insert. The store rejects the second insert and the whole
    /// allocate-and-insert step is retried. No other error is retried.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::CapacityExceeded`] once `9000` is allocated
    /// - [`RegistryError::Store`] on backend failure, or when collisions persist
    #[tracing::instrument(skip(self, registration), fields(full_name = %registration.full_name))]
    pub async fn register(&self, registration: NewRegistration) -> Result<Registration> {
        let created_at = self.clock.now();

        let outcome = retry_with_predicate(
            &self.allocation_retry,
            |attempt| {
                let store = Arc::clone(&self.store);
                let registration = registration.clone();
                async move {
                    let number = next_participation_number(store.as_ref()).await?;
                    tracing::debug!(attempt, participation_number = %number, "Allocated participation number");
                    store
                        .insert(number, registration, created_at)
                        .await
                        .map_err(RegistryError::from)
                }
            },
            RegistryError::is_number_collision,
        )
        .await;

        let outcome_label = match &outcome.result {
            Ok(_) => "created",
            Err(RegistryError::CapacityExceeded { .. }) => "capacity_exceeded",
            Err(_) => "failed",
        };
        metrics::counter!("registry_registrations_total", "outcome" => outcome_label).increment(1);

        let record = outcome.result?;
        tracing::info!(
            record_id = %record.id,
            participation_number = %record.participation_number,
            attempts = outcome.attempts,
            "Registration created"
        );
        Ok(record)
    }

    /// Every record, ordered by participation number.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] on backend failure.
    pub async fn list(&self) -> Result<Vec<Registration>> {
        Ok(self.store.list().await?)
    }

    /// Looks a record up by id.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if no record has `id`
    /// - [`RegistryError::Store`] on backend failure
    pub async fn find(&self, id: Uuid) -> Result<Registration> {
        self.store
            .find(id)
            .await?
            .ok_or(RegistryError::NotFound(id))
    }

    /// Marks the attendee as checked in. Idempotent.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if no record has `id`
    /// - [`RegistryError::Store`] on backend failure
    #[tracing::instrument(skip(self))]
    pub async fn check_in(&self, id: Uuid) -> Result<Registration> {
        let record = self
            .store
            .mark_registered(id)
            .await?
            .ok_or(RegistryError::NotFound(id))?;

        metrics::counter!("registry_register_checkins_total").increment(1);
        tracing::info!(
            record_id = %record.id,
            participation_number = %record.participation_number,
            "Attendee checked in"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use registry_core::{ParticipationNumber, RegisterStatus, StoreError};
    use registry_testing::{InMemoryRecordStore, test_clock};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registrar(store: Arc<dyn RecordStore>) -> Registrar {
        Registrar::new(store, Arc::new(test_clock()))
    }

    fn attendee(name: &str) -> NewRegistration {
        NewRegistration {
            full_name: name.to_string(),
            email_address: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            ..NewRegistration::default()
        }
    }

    #[tokio::test]
    async fn test_sequential_registrations_are_contiguous() {
        let registrar = registrar(Arc::new(InMemoryRecordStore::new()));

        let mut numbers = Vec::new();
        for i in 0..5 {
            let record = registrar.register(attendee(&format!("Guest {i}"))).await.unwrap();
            numbers.push(record.participation_number.to_string());
        }

        assert_eq!(numbers, ["0001", "0002", "0003", "0004", "0005"]);
    }

    #[tokio::test]
    async fn test_new_record_defaults() {
        let registrar = registrar(Arc::new(InMemoryRecordStore::new()));
        let record = registrar.register(attendee("Jane Doe")).await.unwrap();

        assert_eq!(record.status, "pending");
        assert_eq!(record.register_status, RegisterStatus::NotRegistered);
        assert_eq!(record.created_at, test_clock().now());
    }

    #[tokio::test]
    async fn test_capacity_exceeded_creates_nothing() {
        let store = Arc::new(InMemoryRecordStore::new());
        store.seed(ParticipationNumber::new(9000).unwrap(), attendee("Last Guest")).await;
        let registrar = registrar(store.clone());

        let err = registrar.register(attendee("One Too Many")).await.unwrap_err();

        assert!(matches!(err, RegistryError::CapacityExceeded { max: 9000 }));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_check_in_is_idempotent() {
        let registrar = registrar(Arc::new(InMemoryRecordStore::new()));
        let record = registrar.register(attendee("Jane Doe")).await.unwrap();

        let first = registrar.check_in(record.id).await.unwrap();
        let second = registrar.check_in(record.id).await.unwrap();

        assert_eq!(first.register_status, RegisterStatus::Registered);
        assert_eq!(second.register_status, RegisterStatus::Registered);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let registrar = registrar(Arc::new(InMemoryRecordStore::new()));
        let id = Uuid::new_v4();

        assert!(matches!(registrar.find(id).await, Err(RegistryError::NotFound(missing)) if missing == id));
        assert!(matches!(registrar.check_in(id).await, Err(RegistryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_message() {
        let store = Arc::new(InMemoryRecordStore::new());
        store.set_unavailable(true);
        let registrar = registrar(store);

        let err = registrar.register(attendee("Jane Doe")).await.unwrap_err();
        assert!(matches!(err, RegistryError::Store(StoreError::Backend(_))));
    }

    /// Reports a stale maximum on the first read, as if a concurrent
    /// registration had not been seen yet.
    struct StaleFirstRead {
        inner: InMemoryRecordStore,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl RecordStore for StaleFirstRead {
        async fn highest_participation_number(
            &self,
        ) -> std::result::Result<Option<ParticipationNumber>, StoreError> {
            if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(None);
            }
            self.inner.highest_participation_number().await
        }

        async fn insert(
            &self,
            number: ParticipationNumber,
            registration: NewRegistration,
            created_at: DateTime<Utc>,
        ) -> std::result::Result<Registration, StoreError> {
            self.inner.insert(number, registration, created_at).await
        }

        async fn list(&self) -> std::result::Result<Vec<Registration>, StoreError> {
            self.inner.list().await
        }

        async fn find(&self, id: Uuid) -> std::result::Result<Option<Registration>, StoreError> {
            self.inner.find(id).await
        }

        async fn mark_registered(
            &self,
            id: Uuid,
        ) -> std::result::Result<Option<Registration>, StoreError> {
            self.inner.mark_registered(id).await
        }

        async fn ping(&self) -> std::result::Result<(), StoreError> {
            self.inner.ping().await
        }
    }

    #[tokio::test]
    async fn test_collision_is_retried_with_fresh_number() {
        let inner = InMemoryRecordStore::new();
        inner.seed(ParticipationNumber::FIRST, attendee("Early Bird")).await;
        let store = Arc::new(StaleFirstRead {
            inner,
            reads: AtomicUsize::new(0),
        });
        let registrar = registrar(store.clone());

        let record = registrar.register(attendee("Late Comer")).await.unwrap();

        assert_eq!(record.participation_number.to_string(), "0002");
        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_persistent_collision_gives_up() {
        let inner = InMemoryRecordStore::new();
        inner.seed(ParticipationNumber::FIRST, attendee("Early Bird")).await;
        let store = Arc::new(StaleFirstRead {
            inner,
            reads: AtomicUsize::new(0),
        });
        let registrar = registrar(store).with_allocation_retry(RetryPolicy::no_retry());

        let err = registrar.register(attendee("Late Comer")).await.unwrap_err();
        assert!(err.is_number_collision());
    }

    #[tokio::test]
    async fn test_two_concurrent_registrations_get_distinct_numbers() {
        let store = InMemoryRecordStore::new();
        let registrar = registrar(Arc::new(store.clone()));

        let (first, second) = tokio::join!(
            registrar.register(attendee("Jane Doe")),
            registrar.register(attendee("John Roe")),
        );

        let mut numbers = vec![
            first.unwrap().participation_number.to_string(),
            second.unwrap().participation_number.to_string(),
        ];
        numbers.sort();
        assert_eq!(numbers, ["0001", "0002"]);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_are_contiguous() {
        const ATTENDEES: u16 = 8;
        let store = InMemoryRecordStore::new();
        // Every collision means another registration won, so each caller
        // fails at most ATTENDEES - 1 times.
        let registrar = Arc::new(
            registrar(Arc::new(store.clone())).with_allocation_retry(
                RetryPolicy::builder()
                    .max_retries(usize::from(ATTENDEES))
                    .initial_delay(Duration::from_millis(1))
                    .max_delay(Duration::from_millis(5))
                    .build(),
            ),
        );

        let tasks: Vec<_> = (0..ATTENDEES)
            .map(|i| {
                let registrar = Arc::clone(&registrar);
                tokio::spawn(async move { registrar.register(attendee(&format!("Guest {i}"))).await })
            })
            .collect();

        let mut numbers = Vec::new();
        for task in tasks {
            numbers.push(task.await.unwrap().unwrap().participation_number.value());
        }
        numbers.sort_unstable();

        assert_eq!(numbers, (1..=ATTENDEES).collect::<Vec<_>>());
        assert_eq!(store.len().await, usize::from(ATTENDEES));
    }
}
