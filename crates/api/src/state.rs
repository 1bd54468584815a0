use std::sync::Arc;

use chamba_engine::Marketplace;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything lives behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (health checks).
    pub pool: chamba_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Marketplace engine; every read and write goes through it.
    pub marketplace: Arc<Marketplace>,
}
