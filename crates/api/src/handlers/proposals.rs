//! Handlers for the proposal ledger of a service request.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chamba_core::types::DbId;
use chamba_db::models::proposal::SubmitProposal;

use crate::error::AppResult;
use crate::middleware::rbac::{RequireClient, RequireWorker};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /service-requests/{id}/proposals -- bids with worker ratings,
/// cheapest first. Owning client only.
pub async fn list_proposals(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state
        .marketplace
        .request_owned_by(request_id, user.user_id)
        .await?;
    let proposals = state.marketplace.list_proposals(request_id).await?;
    Ok(Json(DataResponse { data: proposals }))
}

/// POST /service-requests/{id}/proposals
pub async fn submit_proposal(
    RequireWorker(user): RequireWorker,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<SubmitProposal>,
) -> AppResult<impl IntoResponse> {
    let proposal = state
        .marketplace
        .submit_proposal(request_id, user.user_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: proposal })))
}

/// POST /service-requests/{id}/proposals/{proposal_id}/accept
///
/// Returns the request, now ACCEPTED and bound to the proposal's worker.
pub async fn accept_proposal(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    Path((request_id, proposal_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    state
        .marketplace
        .request_owned_by(request_id, user.user_id)
        .await?;
    let request = state
        .marketplace
        .accept_proposal(request_id, proposal_id)
        .await?;
    Ok(Json(DataResponse { data: request }))
}
