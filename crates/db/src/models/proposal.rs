//! Proposal entity models and DTOs.

use chamba_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `proposals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Proposal {
    pub id: DbId,
    pub service_request_id: DbId,
    pub worker_id: DbId,
    pub message: String,
    pub offered_price: f64,
    pub is_accepted: bool,
    pub created_at: Timestamp,
}

/// A proposal joined with the bidding worker's public profile fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProposalWithWorker {
    pub id: DbId,
    pub service_request_id: DbId,
    pub worker_id: DbId,
    pub message: String,
    pub offered_price: f64,
    pub is_accepted: bool,
    pub created_at: Timestamp,
    pub worker_rating_average: f64,
    pub worker_rating_count: i32,
    pub worker_years_experience: Option<i32>,
}

/// DTO for `POST /api/v1/service-requests/{id}/proposals`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitProposal {
    pub offered_price: f64,
    pub message: String,
}
