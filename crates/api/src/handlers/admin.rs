//! Administrative maintenance endpoints.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chamba_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /admin/workers/{id}/rating/reconcile
///
/// Rebuild the worker's rating aggregate from their completed requests and
/// return the stored result.
pub async fn reconcile_rating(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(worker_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let aggregate = state
        .marketplace
        .reconcile_rating(worker_id, admin.user_id)
        .await?;
    Ok(Json(DataResponse { data: aggregate }))
}
