//! Handlers for worker matching and the worker's own dashboard.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chamba_core::geo::Coordinates;
use chamba_core::matching::MatchWindow;
use chamba_core::types::DbId;
use chamba_db::models::profile::UpdateAvailability;
use chamba_db::models::service_request::RequestListQuery;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireWorker;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /workers/eligible`.
#[derive(Debug, Deserialize)]
pub struct EligibleWorkersQuery {
    pub category_id: DbId,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}

/// GET /workers/eligible -- available workers covering a point, nearest first.
pub async fn eligible_workers(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<EligibleWorkersQuery>,
) -> AppResult<impl IntoResponse> {
    let origin = Coordinates {
        latitude: params.lat,
        longitude: params.lng,
    };
    let window = MatchWindow {
        offset: params.offset,
        limit: params.limit,
    };
    let workers = state
        .marketplace
        .find_eligible_workers(params.category_id, origin, window)
        .await?;
    Ok(Json(DataResponse { data: workers }))
}

/// GET /workers/me/jobs -- requests bound to the calling worker.
pub async fn my_jobs(
    RequireWorker(user): RequireWorker,
    State(state): State<AppState>,
    Query(params): Query<RequestListQuery>,
) -> AppResult<impl IntoResponse> {
    let jobs = state
        .marketplace
        .list_worker_jobs(user.user_id, &params)
        .await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// PUT /workers/me/availability
pub async fn set_availability(
    RequireWorker(user): RequireWorker,
    State(state): State<AppState>,
    Json(input): Json<UpdateAvailability>,
) -> AppResult<impl IntoResponse> {
    let profile = state
        .marketplace
        .set_availability(user.user_id, input.is_available)
        .await?;
    Ok(Json(DataResponse { data: profile }))
}
