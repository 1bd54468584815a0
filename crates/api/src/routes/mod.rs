pub mod admin;
pub mod categories;
pub mod health;
pub mod service_requests;
pub mod workers;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /categories                                      list (public)
///
/// /service-requests                                create (client)
/// /service-requests/mine                           client's own requests
/// /service-requests/feed                           open requests (worker)
/// /service-requests/{id}                           get (party or admin)
/// /service-requests/{id}/proposals                 list (owner), submit (worker)
/// /service-requests/{id}/proposals/{pid}/accept    accept (owner)
/// /service-requests/{id}/start                     start work (bound worker)
/// /service-requests/{id}/cancel                    cancel (client or worker)
/// /service-requests/{id}/complete                  complete + rate (owner)
///
/// /workers/eligible                                matching query (any role)
/// /workers/me/jobs                                 bound jobs (worker)
/// /workers/me/availability                         toggle (worker)
///
/// /admin/workers/{id}/rating/reconcile             rebuild aggregate (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/service-requests", service_requests::router())
        .nest("/workers", workers::router())
        .nest("/admin", admin::router())
}
