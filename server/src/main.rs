//! Registry HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Start PostgreSQL
//! docker compose up -d
//!
//! # Run server (mail is logged unless MAIL_TRANSPORT=smtp)
//! cargo run --bin registry-server
//! ```

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use registry_core::SystemClock;
use registry_postgres::PostgresRecordStore;
use registry_runtime::{EmailDispatcher, Registrar};
use registry_server::{
    AnyMailer, AppState, Config, PdfRenderer, UploadStore, build_router,
    metrics::register_business_metrics,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long shutdown waits for queued confirmations.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "registry_server=info,registry_runtime=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Registry HTTP Server");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        address = %config.bind_address(),
        mail_transport = %config.mail.transport,
        upload_dir = %config.server.upload_dir.display(),
        "Configuration loaded"
    );

    // Metrics
    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    register_business_metrics();

    // Record store
    info!("Connecting to database...");
    let store = PostgresRecordStore::connect(
        &config.postgres.url,
        config.postgres.max_connections,
        Duration::from_secs(config.postgres.connect_timeout),
    )
    .await?;
    store.migrate().await?;
    info!("Database ready");

    let clock = Arc::new(SystemClock);
    let registrar = Registrar::new(Arc::new(store.clone()), clock.clone());

    // Confirmation dispatcher
    let mailer = AnyMailer::from_config(&config.mail)?;
    let (dispatcher, worker) = EmailDispatcher::spawn(
        Arc::new(mailer),
        Arc::new(PdfRenderer::new()),
        config.mail.dispatch_settings(),
    );

    // Upload directory
    let uploads = UploadStore::new(
        &config.server.upload_dir,
        clock,
        config.server.upload_max_bytes,
    );
    uploads
        .ensure_dir()
        .await
        .with_context(|| format!("Failed to create {}", config.server.upload_dir.display()))?;

    let state = AppState::new(registrar, dispatcher, uploads, &config.server.client_dir)
        .with_mail_response_timeout(config.mail.response_timeout())
        .with_metrics(metrics);

    // Build router
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last dispatcher handle, so the worker now drains.
    info!("Waiting for queued confirmations...");
    match tokio::time::timeout(DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => info!("Confirmation queue drained"),
        Ok(Err(e)) => error!(error = %e, "Dispatch worker panicked"),
        Err(_) => warn!("Confirmation queue did not drain in time"),
    }

    store.close().await;
    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for:
/// - Ctrl+C (SIGINT)
/// - SIGTERM (in production environments)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
