use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gridwatch_api::config::ServerConfig;
use gridwatch_api::router::build_app_router;
use gridwatch_api::state::AppState;
use gridwatch_ingest::mqtt::MqttTransport;
use gridwatch_ingest::service::{IngestionContext, IngestionService};
use gridwatch_ingest::store::PgRecordStore;

/// Upper bound on how long shutdown waits for the ingestion loop.
const INGESTION_STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gridwatch_api=debug,gridwatch_ingest=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        broker = %format!("{}:{}", config.broker.host, config.broker.port),
        topics = config.topics.len(),
        "Loaded server configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = gridwatch_db::create_pool(&database_url, config.db_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!(max_connections = config.db_max_connections, "Database connection pool created");

    gridwatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    gridwatch_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Ingestion ---
    let thresholds = Arc::new(config.thresholds.clone());
    let transport = Arc::new(MqttTransport::new(config.broker.clone()));
    let ingestion = IngestionService::start(
        transport,
        IngestionContext {
            store: Arc::new(PgRecordStore::new(pool.clone())),
            thresholds: Arc::clone(&thresholds),
            topics: config.topics.clone(),
            reconnect: config.reconnect,
        },
    );
    tracing::info!(client_id = %config.broker.client_id, "Ingestion service started");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        thresholds,
        ingestion: ingestion.state_watch(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    ingestion.stop();
    if tokio::time::timeout(INGESTION_STOP_TIMEOUT, ingestion.wait_stopped())
        .await
        .is_err()
    {
        tracing::warn!("Ingestion loop did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
