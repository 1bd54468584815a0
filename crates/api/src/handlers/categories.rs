//! Handlers for the trade category catalog.

use axum::extract::State;
use axum::Json;
use chamba_db::models::category::Category;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /categories -- the seeded catalog, alphabetical. Public.
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let categories = state.marketplace.list_categories().await?;
    Ok(Json(DataResponse { data: categories }))
}
