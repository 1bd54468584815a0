//! Handlers for service requests and their lifecycle.
//!
//! Clients create, complete and list their own requests; workers browse the
//! open feed and start the jobs bound to them; either party may cancel.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chamba_core::types::DbId;
use chamba_db::models::service_request::{
    CompleteServiceRequest, CreateServiceRequest, FeedQuery, RequestListQuery,
};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireClient, RequireWorker};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /service-requests
// ---------------------------------------------------------------------------

/// Open a new request. The location defaults to the client's profile.
pub async fn create_request(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    Json(input): Json<CreateServiceRequest>,
) -> AppResult<impl IntoResponse> {
    let request = state
        .marketplace
        .create_request(user.user_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

// ---------------------------------------------------------------------------
// GET /service-requests/mine
// ---------------------------------------------------------------------------

/// The caller's requests, newest first, with category name and bid count.
pub async fn list_my_requests(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    Query(params): Query<RequestListQuery>,
) -> AppResult<impl IntoResponse> {
    let requests = state
        .marketplace
        .list_client_requests(user.user_id, &params)
        .await?;
    Ok(Json(DataResponse { data: requests }))
}

// ---------------------------------------------------------------------------
// GET /service-requests/feed
// ---------------------------------------------------------------------------

/// Requests still taking proposals, optionally for one category.
pub async fn open_feed(
    RequireWorker(_user): RequireWorker,
    State(state): State<AppState>,
    Query(params): Query<FeedQuery>,
) -> AppResult<impl IntoResponse> {
    let requests = state.marketplace.open_feed(&params).await?;
    Ok(Json(DataResponse { data: requests }))
}

// ---------------------------------------------------------------------------
// GET /service-requests/{id}
// ---------------------------------------------------------------------------

pub async fn get_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = state
        .marketplace
        .request_visible_to(id, auth.user_id, auth.is_admin())
        .await?;
    Ok(Json(DataResponse { data: request }))
}

// ---------------------------------------------------------------------------
// Lifecycle transitions
// ---------------------------------------------------------------------------

/// POST /service-requests/{id}/start -- the bound worker begins the job.
pub async fn start_work(
    RequireWorker(user): RequireWorker,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = state.marketplace.start_work(id, user.user_id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /service-requests/{id}/cancel -- either party, within the rules of
/// the current status.
pub async fn cancel_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let actor = auth.actor()?;
    let request = state.marketplace.cancel(id, actor).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /service-requests/{id}/complete -- the owning client closes the job
/// with a 1-5 rating.
pub async fn complete_request(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CompleteServiceRequest>,
) -> AppResult<impl IntoResponse> {
    state.marketplace.request_owned_by(id, user.user_id).await?;
    let request = state
        .marketplace
        .complete(id, input.rating, input.review)
        .await?;
    Ok(Json(DataResponse { data: request }))
}
