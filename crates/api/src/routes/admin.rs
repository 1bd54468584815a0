//! Mounted at `/admin` by `api_routes()`. Every route requires the admin role.

use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// ```text
/// POST   /workers/{id}/rating/reconcile   -> reconcile_rating
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/workers/{id}/rating/reconcile",
        post(admin::reconcile_rating),
    )
}
