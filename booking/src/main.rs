//! Booking engine HTTP server.
//!
//! Wires the settlement core to in-memory stores, the configured payment
//! gateway, and a Prometheus metrics exporter.

use std::sync::Arc;

use boxoffice_booking::config::{Config, GatewayMode};
use boxoffice_booking::dispatch::EffectDispatcher;
use boxoffice_booking::gateway::{HttpPaymentGateway, MockPaymentGateway};
use boxoffice_booking::server::{AppState, build_router};
use boxoffice_booking::services::{BookingService, PaymentService};
use boxoffice_booking::stores::{
    FileArtifactStore, InMemoryCatalog, InMemoryPaymentLog, InMemoryPaymentStore,
    InMemoryRegistrationStore, LogNotifier, TextTicketRenderer,
};
use boxoffice_core::environment::{Clock, SystemClock};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env();

    // Initialize tracing; `RUST_LOG` flows in through the configured filter
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.server.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting booking engine HTTP server");
    info!(
        gateway_mode = ?config.gateway.mode,
        artifact_root = %config.artifacts.root,
        "Configuration loaded"
    );

    // Metrics exporter for Prometheus scraping
    boxoffice_booking::metrics::register_business_metrics();
    let metrics_addr: std::net::SocketAddr = format!(
        "{}:{}",
        config.server.metrics_host, config.server.metrics_port
    )
    .parse()?;
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()?;
    info!(address = %metrics_addr, "Metrics exporter listening");

    // Stores
    let catalog = Arc::new(InMemoryCatalog::new());
    let registrations = Arc::new(InMemoryRegistrationStore::new());
    let payments = Arc::new(InMemoryPaymentStore::new());
    let audit = Arc::new(InMemoryPaymentLog::new());

    // Issuance providers
    let renderer = Arc::new(TextTicketRenderer::new());
    let artifacts = Arc::new(FileArtifactStore::new(
        config.artifacts.root.clone(),
        config.artifacts.public_base_url.clone(),
    ));
    let notifier = Arc::new(LogNotifier::new());

    // Payment gateway
    let gateway = match config.gateway.mode {
        GatewayMode::Mock => {
            info!("Using the mock payment gateway");
            MockPaymentGateway::shared()
        }
        GatewayMode::Live => HttpPaymentGateway::shared(config.gateway.clone())?,
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Effect dispatcher for issuance and notifications
    let dispatcher = Arc::new(EffectDispatcher::new(
        catalog.clone(),
        registrations.clone(),
        renderer,
        artifacts,
        notifier,
        config.dispatch.clone(),
    ));

    // Services
    let bookings = Arc::new(BookingService::new(
        catalog,
        registrations.clone(),
        dispatcher.clone(),
        clock.clone(),
    ));
    let payment_service = Arc::new(PaymentService::new(
        gateway,
        payments,
        registrations,
        audit,
        dispatcher,
        clock,
    ));

    // Build router
    let state = AppState::new(bookings, payment_service);
    let app = build_router(state);

    // Create server address
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {addr}");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for Ctrl+C (SIGINT) or SIGTERM. A handler that cannot be
/// installed is logged and parked so it never triggers a spurious
/// shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(error = %error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to install SIGTERM handler");
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
