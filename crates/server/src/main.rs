//! Farol server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use farol_api::middleware::{AppState, principal_middleware};
use farol_api::router as api_router;
use farol_common::{Config, LocalStorage};
use farol_core::{AnalyticsService, ComplaintService, NotificationService, StatusPolicy};
use farol_db::repositories::{
    AttachmentRepository, ComplaintRepository, NotificationRepository, SchoolRepository,
    StaffRepository, StatusLogRepository, StudentRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Attachments accepted per request, used to size the body limit.
const MAX_FILES_PER_REQUEST: usize = 10;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farol=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting farol server...");

    // Load configuration
    let config = Config::load()?;
    let policy = Arc::new(StatusPolicy::from_config(&config.lifecycle)?);

    // Connect to database
    let db = Arc::new(farol_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    farol_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let complaint_repo = ComplaintRepository::new(Arc::clone(&db));
    let attachment_repo = AttachmentRepository::new(Arc::clone(&db));
    let student_repo = StudentRepository::new(Arc::clone(&db));
    let staff_repo = StaffRepository::new(Arc::clone(&db));
    let school_repo = SchoolRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let status_log_repo = StatusLogRepository::new(Arc::clone(&db));

    // Initialize services
    let storage = Arc::new(LocalStorage::from_config(&config.files));
    let notification_service = NotificationService::new(notification_repo);
    let mut complaint_service = ComplaintService::new(
        complaint_repo.clone(),
        attachment_repo,
        student_repo,
        staff_repo,
        school_repo,
        notification_service.clone(),
        storage,
        Arc::clone(&policy),
    );
    complaint_service.set_max_file_size(config.files.max_file_size);
    let analytics_service = AnalyticsService::new(complaint_repo, status_log_repo, policy);

    let state = AppState {
        complaint_service,
        notification_service,
        analytics_service,
    };

    let body_limit = config
        .files
        .max_file_size
        .saturating_mul(MAX_FILES_PER_REQUEST);

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn(principal_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(60)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
