use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chamba_api::config::ServerConfig;
use chamba_api::router::build_app_router;
use chamba_api::state::AppState;
use chamba_engine::{EngineConfig, Marketplace};
use chamba_events::{EventBus, EventRelay};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "chamba_api=debug,chamba_engine=debug,chamba_events=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let engine_config = EngineConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    tracing::info!(
        max_retries = engine_config.max_retries,
        lock_timeout_ms = engine_config.lock_timeout_ms,
        "Loaded engine configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = chamba_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    chamba_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    chamba_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let relay_handle = tokio::spawn(EventRelay::run(event_bus.subscribe()));
    tracing::info!("Event bus and relay started");

    // --- App state ---
    let marketplace = Arc::new(Marketplace::new(
        pool.clone(),
        Arc::clone(&event_bus),
        engine_config,
    ));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        marketplace,
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

    // The router and the marketplace are gone; dropping the last bus handle
    // closes the channel so the relay drains and exits.
    drop(event_bus);
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    match tokio::time::timeout(drain, relay_handle).await {
        Ok(Ok(handled)) => tracing::info!(handled, "Event relay drained"),
        Ok(Err(err)) => tracing::error!(error = %err, "Event relay task failed"),
        Err(_) => tracing::warn!("Event relay did not drain before the shutdown timeout"),
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM (on Unix) to begin graceful shutdown.
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
