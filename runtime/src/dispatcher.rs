//! Confirmation email dispatch.
//!
//! Confirmations are submitted to a bounded queue and delivered by a
//! background worker, so "record exists" and "confirmation delivered" are
//! separate, independently observable outcomes. Each job:
//!
//! 1. renders the confirmation document (failures are final),
//! 2. composes the email from the [`ConfirmationTemplate`],
//! 3. sends it, retrying transient relay failures under the [`RetryPolicy`].
//!
//! Progress is recorded in a [`DeliveryLedger`] keyed by delivery id, and the
//! final status is also pushed to the submitter through its [`DeliveryTicket`].
//!
//! ```text
//! submit() ──► mpsc queue ──► worker ──► spawn per job ──► render ─► send (retry)
//!    │                                                                 │
//!    └──────────── DeliveryTicket ◄──── oneshot ◄──── final status ◄──┘
//! ```

use crate::retry::{RetryPolicy, retry_with_predicate};
use registry_core::{Confirmation, ConfirmationMailer, ConfirmationTemplate, DocumentRenderer, MailError};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use uuid::Uuid;

/// Observable state of one delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Waiting in the queue.
    Queued,
    /// A send attempt is in flight.
    Sending {
        /// 1-based attempt number.
        attempt: usize,
    },
    /// The relay accepted the message.
    Delivered {
        /// Attempts it took.
        attempts: usize,
    },
    /// Rendering failed or the relay kept refusing.
    Failed {
        /// Send attempts made (0 when rendering failed).
        attempts: usize,
        /// Last error.
        error: String,
    },
}

impl DeliveryStatus {
    /// Whether this is a final state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered { .. } | Self::Failed { .. })
    }
}

/// Dispatch errors visible to submitters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The worker has shut down.
    #[error("confirmation queue is closed")]
    QueueClosed,
}

/// Dispatcher tuning.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Queue bound.
    pub queue_capacity: usize,
    /// Retry policy for relay failures.
    pub retry: RetryPolicy,
    /// Fixed email parts.
    pub template: ConfirmationTemplate,
    /// Finished deliveries kept in the ledger; older ones are evicted.
    pub ledger_capacity: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            retry: RetryPolicy::builder()
                .max_retries(3)
                .initial_delay(Duration::from_millis(500))
                .max_delay(Duration::from_secs(10))
                .build(),
            template: ConfirmationTemplate::default(),
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
        }
    }
}

/// Finished deliveries a default ledger remembers.
pub const DEFAULT_LEDGER_CAPACITY: usize = 1024;

/// Shared delivery-status table.
///
/// In-flight deliveries are always kept. Finished ones are remembered up to
/// the ledger's capacity, then evicted oldest first.
#[derive(Debug, Clone)]
pub struct DeliveryLedger {
    inner: Arc<RwLock<LedgerEntries>>,
}

#[derive(Debug)]
struct LedgerEntries {
    statuses: HashMap<Uuid, DeliveryStatus>,
    finished: VecDeque<Uuid>,
    capacity: usize,
}

impl Default for DeliveryLedger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LEDGER_CAPACITY)
    }
}

impl DeliveryLedger {
    /// Creates a ledger remembering at most `capacity` finished deliveries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LedgerEntries {
                statuses: HashMap::new(),
                finished: VecDeque::new(),
                capacity,
            })),
        }
    }

    /// Current status of `id`, if it was submitted and not yet evicted.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<DeliveryStatus> {
        self.inner
            .read()
            .ok()
            .and_then(|entries| entries.statuses.get(&id).cloned())
    }

    /// Number of deliveries currently remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().map_or(0, |entries| entries.statuses.len())
    }

    /// Whether the ledger remembers no delivery.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, id: Uuid, status: DeliveryStatus) {
        let Ok(mut entries) = self.inner.write() else {
            tracing::warn!(delivery_id = %id, "Failed to acquire write lock on delivery ledger");
            return;
        };

        let terminal = status.is_terminal();
        let was_terminal = entries
            .statuses
            .insert(id, status)
            .is_some_and(|previous| previous.is_terminal());
        if !terminal || was_terminal {
            return;
        }

        entries.finished.push_back(id);
        while entries.finished.len() > entries.capacity {
            if let Some(evicted) = entries.finished.pop_front() {
                entries.statuses.remove(&evicted);
            }
        }
    }
}

/// Handle returned by [`EmailDispatcher::submit`].
#[derive(Debug)]
pub struct DeliveryTicket {
    /// Delivery id, usable with [`EmailDispatcher::status`].
    pub id: Uuid,
    outcome: oneshot::Receiver<DeliveryStatus>,
}

impl DeliveryTicket {
    /// Waits up to `timeout` for the final status.
    ///
    /// Returns `None` if the delivery is still in progress when the timeout
    /// elapses; it keeps running in the background.
    pub async fn wait(self, timeout: Duration) -> Option<DeliveryStatus> {
        match tokio::time::timeout(timeout, self.outcome).await {
            Ok(Ok(status)) => Some(status),
            Ok(Err(_)) | Err(_) => None,
        }
    }
}

struct Job {
    id: Uuid,
    confirmation: Confirmation,
    reply: oneshot::Sender<DeliveryStatus>,
}

/// Cloneable handle to the confirmation queue.
#[derive(Clone)]
pub struct EmailDispatcher {
    sender: mpsc::Sender<Job>,
    ledger: DeliveryLedger,
}

impl EmailDispatcher {
    /// Starts the dispatch worker.
    ///
    /// The worker exits once every `EmailDispatcher` clone is dropped and the
    /// in-flight jobs have finished; await the returned handle to drain.
    #[must_use]
    pub fn spawn<M, R>(mailer: Arc<M>, renderer: Arc<R>, settings: DispatchSettings) -> (Self, JoinHandle<()>)
    where
        M: ConfirmationMailer + 'static,
        R: DocumentRenderer + 'static,
    {
        let (sender, receiver) = mpsc::channel(settings.queue_capacity.max(1));
        let ledger = DeliveryLedger::with_capacity(settings.ledger_capacity);

        let worker = Worker {
            mailer,
            renderer,
            retry: settings.retry,
            template: Arc::new(settings.template),
            ledger: ledger.clone(),
        };
        let handle = tokio::spawn(worker.run(receiver));

        (Self { sender, ledger }, handle)
    }

    /// Queues `confirmation` for delivery.
    ///
    /// Waits for queue space if the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::QueueClosed`] if the worker is gone.
    pub async fn submit(&self, confirmation: Confirmation) -> Result<DeliveryTicket, DispatchError> {
        let id = Uuid::new_v4();
        let (reply, outcome) = oneshot::channel();

        self.ledger.record(id, DeliveryStatus::Queued);
        let job = Job {
            id,
            confirmation,
            reply,
        };

        if self.sender.send(job).await.is_err() {
            self.ledger.record(
                id,
                DeliveryStatus::Failed {
                    attempts: 0,
                    error: DispatchError::QueueClosed.to_string(),
                },
            );
            return Err(DispatchError::QueueClosed);
        }

        tracing::debug!(delivery_id = %id, "Confirmation queued");
        Ok(DeliveryTicket { id, outcome })
    }

    /// Current status of a delivery.
    #[must_use]
    pub fn status(&self, id: Uuid) -> Option<DeliveryStatus> {
        self.ledger.get(id)
    }

    /// The status table shared with the worker.
    #[must_use]
    pub fn ledger(&self) -> &DeliveryLedger {
        &self.ledger
    }
}

struct Worker<M, R> {
    mailer: Arc<M>,
    renderer: Arc<R>,
    retry: RetryPolicy,
    template: Arc<ConfirmationTemplate>,
    ledger: DeliveryLedger,
}

impl<M, R> Worker<M, R>
where
    M: ConfirmationMailer + 'static,
    R: DocumentRenderer + 'static,
{
    async fn run(self, mut receiver: mpsc::Receiver<Job>) {
        tracing::info!("Confirmation dispatcher started");
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                job = receiver.recv() => {
                    let Some(job) = job else { break };
                    in_flight.spawn(deliver(
                        job,
                        Arc::clone(&self.mailer),
                        Arc::clone(&self.renderer),
                        self.retry.clone(),
                        Arc::clone(&self.template),
                        self.ledger.clone(),
                    ));
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Confirmation task panicked");
                    }
                }
            }
        }

        tracing::info!(in_flight = in_flight.len(), "Confirmation queue closed, draining");
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Confirmation task panicked");
            }
        }
        tracing::info!("Confirmation dispatcher stopped");
    }
}

#[tracing::instrument(skip_all, fields(delivery_id = %job.id))]
async fn deliver<M, R>(
    job: Job,
    mailer: Arc<M>,
    renderer: Arc<R>,
    retry: RetryPolicy,
    template: Arc<ConfirmationTemplate>,
    ledger: DeliveryLedger,
) where
    M: ConfirmationMailer,
    R: DocumentRenderer,
{
    let Job {
        id,
        confirmation,
        reply,
    } = job;

    let status = match renderer.render(&confirmation) {
        Err(e) => {
            tracing::error!(error = %e, "Failed to render confirmation document");
            DeliveryStatus::Failed {
                attempts: 0,
                error: e.to_string(),
            }
        }
        Ok(document) => {
            let mail = template.compose(&confirmation, document);
            let mailer = mailer.as_ref();
            let mail = &mail;
            let ledger_ref = &ledger;

            let outcome = retry_with_predicate(
                &retry,
                move |attempt| {
                    ledger_ref.record(id, DeliveryStatus::Sending { attempt });
                    mailer.send(mail)
                },
                MailError::is_transient,
            )
            .await;

            #[allow(clippy::cast_precision_loss)]
            metrics::histogram!("registry_confirmation_attempts").record(outcome.attempts as f64);

            match outcome.result {
                Ok(()) => DeliveryStatus::Delivered {
                    attempts: outcome.attempts,
                },
                Err(e) => DeliveryStatus::Failed {
                    attempts: outcome.attempts,
                    error: e.to_string(),
                },
            }
        }
    };

    let label = if matches!(status, DeliveryStatus::Delivered { .. }) {
        tracing::info!(to = %confirmation.to, "Confirmation delivered");
        "delivered"
    } else {
        tracing::warn!(to = %confirmation.to, ?status, "Confirmation not delivered");
        "failed"
    };
    metrics::counter!("registry_confirmations_total", "outcome" => label).increment(1);

    ledger.record(id, status.clone());
    // The submitter may have stopped waiting.
    let _ = reply.send(status);
}
