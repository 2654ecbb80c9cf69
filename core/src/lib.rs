//! # Attendee Registry Core
//!
//! Domain types and dependency traits for the attendee registry.
//!
//! This crate is the functional core: it owns the registration record, the
//! participation-number arithmetic, boundary validation, and the traits the
//! imperative shell implements (record store, clock, mailer, document renderer).
//! Nothing in here performs I/O.
//!
//! ## Core Concepts
//!
//! - **Registration**: the single persisted entity
//! - **Participation number**: four-digit, zero-padded, strictly increasing
//! - **Register status**: `"No Register"` until the attendee is checked in
//! - **Confirmation**: the attendee fields printed on the emailed document
//!
//! ## Example
//!
//! ```
//! use registry_core::registration::ParticipationNumber;
//!
//! let first = ParticipationNumber::after(None).unwrap();
//! assert_eq!(first.to_string(), "0001");
//!
//! let next = ParticipationNumber::after(Some(first)).unwrap();
//! assert_eq!(next.to_string(), "0002");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod confirmation;
pub mod document;
pub mod environment;
pub mod error;
pub mod registration;
pub mod sequence;
pub mod store;
pub mod validation;

pub use confirmation::{Confirmation, ConfirmationMailer, ConfirmationTemplate, MailError, OutgoingMail};
pub use document::{DocumentError, DocumentRenderer};
pub use environment::{Clock, SystemClock};
pub use error::{RegistryError, Result};
pub use registration::{NewRegistration, ParticipationNumber, RegisterStatus, Registration};
pub use store::{RecordStore, StoreError};
pub use validation::{ConfirmationRequest, RegistrationForm, ValidationError};
