//! Route definitions for service requests and their proposals.
//!
//! Mounted at `/service-requests` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{proposals, service_requests};
use crate::state::AppState;

/// Service request routes.
///
/// ```text
/// POST   /                                  -> create_request
/// GET    /mine                              -> list_my_requests
/// GET    /feed                              -> open_feed
/// GET    /{id}                              -> get_request
/// GET    /{id}/proposals                    -> list_proposals
/// POST   /{id}/proposals                    -> submit_proposal
/// POST   /{id}/proposals/{proposal_id}/accept -> accept_proposal
/// POST   /{id}/start                        -> start_work
/// POST   /{id}/cancel                       -> cancel_request
/// POST   /{id}/complete                     -> complete_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(service_requests::create_request))
        .route("/mine", get(service_requests::list_my_requests))
        .route("/feed", get(service_requests::open_feed))
        .route("/{id}", get(service_requests::get_request))
        .route(
            "/{id}/proposals",
            get(proposals::list_proposals).post(proposals::submit_proposal),
        )
        .route(
            "/{id}/proposals/{proposal_id}/accept",
            post(proposals::accept_proposal),
        )
        .route("/{id}/start", post(service_requests::start_work))
        .route("/{id}/cancel", post(service_requests::cancel_request))
        .route("/{id}/complete", post(service_requests::complete_request))
}
