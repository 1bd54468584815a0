//! Route definitions for worker matching and the worker dashboard.
//!
//! Mounted at `/workers` by `api_routes()`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::workers;
use crate::state::AppState;

/// ```text
/// GET    /eligible          -> eligible_workers
/// GET    /me/jobs           -> my_jobs
/// PUT    /me/availability   -> set_availability
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/eligible", get(workers::eligible_workers))
        .route("/me/jobs", get(workers::my_jobs))
        .route("/me/availability", put(workers::set_availability))
}
