use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wayfarer_api::config::ServerConfig;
use wayfarer_api::router::build_app_router;
use wayfarer_api::state::AppState;
use wayfarer_events::AuthAuditLog;
use wayfarer_store::kv::FileKv;
use wayfarer_store::mode::ModeResolver;
use wayfarer_store::Services;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "wayfarer_api=debug,wayfarer_store=debug,wayfarer_events=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        requested_mode = config.store.mode.as_str(),
        data_dir = %config.store.data_dir.display(),
        "Loaded server configuration"
    );

    // --- Storage mode ---
    let resolver = ModeResolver::resolve(&config.store).await;
    if let Some(pool) = resolver.pool() {
        wayfarer_db::run_migrations(pool)
            .await
            .expect("Failed to run database migrations");
        tracing::info!("Database migrations applied");
    }

    // --- Services ---
    let kv = Arc::new(FileKv::new(config.store.kv_dir()));
    let services = Arc::new(Services::build(&resolver, &config.store, kv));
    tracing::info!(mode = services.mode.as_str(), "Services built");

    let audit_handle = tokio::spawn(AuthAuditLog::run(services.events.subscribe()));

    let identity = services.auth.initialize().await;
    tracing::info!(signed_in = identity.is_some(), "Auth session restored");

    // --- App state ---
    let state = AppState {
        services: Arc::clone(&services),
        pool: resolver.pool().cloned(),
        files_dir: resolver.pool().map(|_| config.store.blob_dir()),
        config: Arc::new(config.clone()),
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

    // Dropping the last services handle closes the event bus.
    drop(services);
    let _ = tokio::time::timeout(Duration::from_secs(5), audit_handle).await;

    if let Some(pool) = resolver.pool() {
        pool.close().await;
        tracing::info!("Database pool closed");
    }

    tracing::info!("Graceful shutdown complete");
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
