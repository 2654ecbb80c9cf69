//! # Registry Runtime
//!
//! Runs the registry's workflows on top of the domain types in
//! `registry-core`.
//!
//! ## Core Components
//!
//! - **[`Registrar`]**: allocates participation numbers and drives the record store
//! - **[`EmailDispatcher`]**: queues confirmation emails and delivers them in the background
//! - **[`retry`]**: exponential backoff shared by both
//!
//! ## Example
//!
//! ```ignore
//! use registry_runtime::{DispatchSettings, EmailDispatcher, Registrar};
//!
//! let registrar = Registrar::new(store, clock);
//! let record = registrar.register(new_registration).await?;
//!
//! let (dispatcher, worker) = EmailDispatcher::spawn(mailer, renderer, DispatchSettings::default());
//! let ticket = dispatcher.submit(Confirmation::from(&record)).await?;
//! let status = ticket.wait(Duration::from_secs(30)).await;
//! ```

/// Retry logic with exponential backoff
pub mod retry;

/// Registration workflow over a record store
pub mod registrar;

/// Background confirmation email delivery
pub mod dispatcher;

pub use dispatcher::{
    DEFAULT_LEDGER_CAPACITY, DeliveryLedger, DeliveryStatus, DeliveryTicket, DispatchError, DispatchSettings, EmailDispatcher,
};
pub use registrar::{Registrar, default_allocation_retry};
pub use retry::{Attempted, RetryPolicy, RetryPolicyBuilder, retry_with_predicate};
