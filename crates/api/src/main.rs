use std::net::SocketAddr;
use std::sync::Arc;

use folio_core::gallery::GalleryService;
use folio_core::gateway::{ObjectStore, PhotoRecords};
use folio_core::memory::{MemoryObjectStore, MemoryPhotoRecords};
use folio_storage::{S3ObjectStore, StorageConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_api::config::ServerConfig;
use folio_api::router::build_app_router;
use folio_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "folio_api=debug,folio_core=debug,folio_db=debug,folio_storage=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Gateways ---
    let (records, objects) = if config.in_memory {
        tracing::warn!("FOLIO_IN_MEMORY is set; photos are not persisted");
        in_memory_gateways()
    } else {
        persistent_gateways().await
    };
    let gallery = GalleryService::new(records, objects);

    // --- App state ---
    let state = AppState { gallery };
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

    tracing::info!("Graceful shutdown complete");
}

fn in_memory_gateways() -> (Arc<dyn PhotoRecords>, Arc<dyn ObjectStore>) {
    let domain = std::env::var("PUBLIC_ASSET_DOMAIN")
        .unwrap_or_else(|_| "http://localhost:3000/assets".into());
    (
        Arc::new(MemoryPhotoRecords::new()),
        Arc::new(MemoryObjectStore::new(domain)),
    )
}

async fn persistent_gateways() -> (Arc<dyn PhotoRecords>, Arc<dyn ObjectStore>) {
    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = folio_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    folio_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    folio_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Object storage ---
    let storage_config = StorageConfig::from_env().unwrap_or_else(|e| panic!("{e}"));
    let store = S3ObjectStore::connect(&storage_config).await;

    (
        Arc::new(folio_db::PgPhotoRecords::new(pool)),
        Arc::new(store),
    )
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
