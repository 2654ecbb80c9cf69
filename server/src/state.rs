//! Application state for the registry HTTP server.
//!
//! Contains all shared resources needed by HTTP handlers:
//! - Registrar (record store access and number allocation)
//! - Confirmation dispatcher
//! - Upload store
//! - Prometheus handle for `/metrics`

use crate::upload::UploadStore;
use metrics_exporter_prometheus::PrometheusHandle;
use registry_runtime::{EmailDispatcher, Registrar};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all HTTP handlers.
///
/// It's cloned (cheaply via Arc) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Registration workflow over the record store
    pub registrar: Arc<Registrar>,

    /// Confirmation email queue
    pub dispatcher: EmailDispatcher,

    /// Profile picture storage
    pub uploads: Arc<UploadStore>,

    /// Directory holding the browser client
    pub client_dir: PathBuf,

    /// How long `/send-email` waits for the delivery outcome
    pub mail_response_timeout: Duration,

    /// Prometheus recorder handle, if one is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// - `registrar`: Registration workflow
    /// - `dispatcher`: Confirmation email queue
    /// - `uploads`: Profile picture storage
    /// - `client_dir`: Browser client assets
    #[must_use]
    pub fn new(
        registrar: Registrar,
        dispatcher: EmailDispatcher,
        uploads: UploadStore,
        client_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registrar: Arc::new(registrar),
            dispatcher,
            uploads: Arc::new(uploads),
            client_dir: client_dir.into(),
            mail_response_timeout: Duration::from_secs(30),
            metrics: None,
        }
    }

    /// Overrides how long `/send-email` waits before answering 202.
    #[must_use]
    pub const fn with_mail_response_timeout(mut self, timeout: Duration) -> Self {
        self.mail_response_timeout = timeout;
        self
    }

    /// Attaches the Prometheus handle rendered at `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
