//! # Registry Server
//!
//! HTTP server for a single-event attendee registry.
//!
//! Attendees register through a multipart form and receive a sequential
//! four-digit participation number. Staff look records up by id, check
//! attendees in, and email them a PDF confirmation.
//!
//! ## Architecture
//!
//! ```text
//! HTTP request ─▶ api handlers ─▶ Registrar ─▶ RecordStore (PostgreSQL)
//!                      │
//!                      └─▶ EmailDispatcher ─▶ PdfRenderer + AnyMailer (SMTP / console)
//! ```
//!
//! ## Modules
//!
//! - [`api`]: Endpoint handlers
//! - [`config`]: Environment configuration
//! - [`routes`]: Router assembly
//! - [`state`]: Shared handler state
//! - [`mail`]: SMTP and console mailers
//! - [`document`]: PDF rendering
//! - [`upload`]: Profile picture storage

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod document;
pub mod error;
pub mod health;
pub mod mail;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::{Config, ConfigError, MailTransport};
pub use document::PdfRenderer;
pub use error::AppError;
pub use mail::{AnyMailer, ConsoleMailer, SmtpMailer};
pub use routes::build_router;
pub use state::AppState;
pub use upload::{StoredUpload, UploadStore};
