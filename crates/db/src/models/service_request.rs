//! Service request entity models and DTOs.

use chamba_core::error::CoreError;
use chamba_core::lifecycle::{Party, ServiceStatus};
use chamba_core::rating::Rating;
use chamba_core::status::StatusId;
use chamba_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `service_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceRequest {
    pub id: DbId,
    pub client_id: DbId,
    pub worker_id: Option<DbId>,
    pub category_id: DbId,
    pub title: String,
    pub description: String,
    pub address_text: String,
    pub photo_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub scheduled_at: Option<Timestamp>,
    pub estimated_price: Option<f64>,
    pub rating: Option<i16>,
    pub review: Option<String>,
    pub status_id: StatusId,
    pub cancelled_by: Option<String>,
    pub requested_at: Timestamp,
    pub accepted_at: Option<Timestamp>,
    pub started_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ServiceRequest {
    /// Decode the stored status id.
    ///
    /// The lookup table's foreign key keeps ids in range, so an unknown id
    /// means the schema and [`ServiceStatus`] have drifted apart.
    pub fn status(&self) -> Result<ServiceStatus, CoreError> {
        ServiceStatus::from_id(self.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "Service request {} has unknown status id {}",
                self.id, self.status_id
            ))
        })
    }

    /// Whether `user_id` is the client or the bound worker.
    pub fn is_party(&self, user_id: DbId) -> bool {
        self.client_id == user_id || self.worker_id == Some(user_id)
    }
}

/// A client's request with its category name and proposal count, for
/// `GET /service-requests/mine`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientRequestSummary {
    pub id: DbId,
    pub title: String,
    pub category_id: DbId,
    pub category_name: String,
    pub worker_id: Option<DbId>,
    pub status_id: StatusId,
    pub estimated_price: Option<f64>,
    pub scheduled_at: Option<Timestamp>,
    pub requested_at: Timestamp,
    pub proposal_count: i64,
}

/// A job in the open-request feed shown to workers.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OpenRequestSummary {
    pub id: DbId,
    pub client_id: DbId,
    pub category_id: DbId,
    pub category_name: String,
    pub title: String,
    pub description: String,
    pub address_text: String,
    pub photo_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub scheduled_at: Option<Timestamp>,
    pub estimated_price: Option<f64>,
    pub requested_at: Timestamp,
}

/// DTO for `POST /api/v1/service-requests`.
///
/// When `latitude`/`longitude` are omitted the client's profile location is
/// snapshotted instead.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceRequest {
    pub category_id: DbId,
    pub title: String,
    pub description: String,
    pub address_text: String,
    pub photo_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub scheduled_at: Option<Timestamp>,
    pub estimated_price: Option<f64>,
}

/// DTO for `POST /api/v1/service-requests/{id}/complete`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteServiceRequest {
    pub rating: i16,
    pub review: Option<String>,
}

/// Query parameters for `GET /api/v1/service-requests/feed`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub category_id: Option<DbId>,
    /// Maximum number of results. Defaults to 20, capped at 100.
    pub limit: Option<i64>,
}

/// Query parameters for the per-party request listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestListQuery {
    /// Filter by status ID (1 = requested ... 5 = cancelled).
    pub status_id: Option<StatusId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// The dependent-field changes that travel with a status change.
///
/// Each variant is applied as one `UPDATE` together with the new status.
#[derive(Debug, Clone)]
pub enum RequestTransition {
    /// Bind the winning worker and adopt the accepted price.
    Accept { worker_id: DbId, price: f64 },
    Start,
    Complete {
        rating: Rating,
        review: Option<String>,
    },
    Cancel { by: Party },
}
