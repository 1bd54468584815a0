//! Client and worker profile models.
//!
//! Profiles are written by the external user-management service. The engine
//! reads them and, for workers, owns the availability flag and the rating
//! aggregate.

use chamba_core::geo::Coordinates;
use chamba_core::matching::Candidate;
use chamba_core::rating::RatingAggregate;
use chamba_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (match database tables)
// ---------------------------------------------------------------------------

/// A row from the `client_profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientProfile {
    pub user_id: DbId,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub exterior_number: Option<String>,
    pub interior_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub address_notes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ClientProfile {
    /// The client's current home coordinates, when both are on file.
    pub fn location(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// A row from the `worker_profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkerProfile {
    pub user_id: DbId,
    pub bio: Option<String>,
    pub years_experience: Option<i32>,
    pub hourly_rate: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub coverage_radius_km: f64,
    pub is_available: bool,
    pub rating_average: f64,
    pub rating_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WorkerProfile {
    pub fn rating(&self) -> RatingAggregate {
        RatingAggregate {
            average: self.rating_average,
            count: self.rating_count,
        }
    }
}

/// A worker row joined with its trade set, as read by the matching query.
#[derive(Debug, Clone, FromRow)]
pub struct WorkerCandidate {
    pub user_id: DbId,
    pub latitude: f64,
    pub longitude: f64,
    pub coverage_radius_km: f64,
    pub is_available: bool,
    pub rating_average: f64,
    pub rating_count: i32,
    pub hourly_rate: Option<f64>,
    pub years_experience: Option<i32>,
    pub trades: Vec<DbId>,
}

impl From<WorkerCandidate> for Candidate {
    fn from(row: WorkerCandidate) -> Self {
        Candidate {
            worker_id: row.user_id,
            base: Coordinates {
                latitude: row.latitude,
                longitude: row.longitude,
            },
            coverage_radius_km: row.coverage_radius_km,
            is_available: row.is_available,
            trades: row.trades,
            rating: RatingAggregate {
                average: row.rating_average,
                count: row.rating_count,
            },
            hourly_rate: row.hourly_rate,
            years_experience: row.years_experience,
        }
    }
}

// ---------------------------------------------------------------------------
// Create / Update DTOs
// ---------------------------------------------------------------------------

/// DTO for inserting a client profile (profile service and test fixtures).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateClientProfile {
    pub user_id: DbId,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub exterior_number: Option<String>,
    pub interior_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub address_notes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// DTO for inserting a worker profile with its trade set.
///
/// `trade_ids` must be non-empty; the profile service validates this
/// before writing.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkerProfile {
    pub user_id: DbId,
    pub bio: Option<String>,
    pub years_experience: Option<i32>,
    pub hourly_rate: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub coverage_radius_km: f64,
    pub is_available: Option<bool>,
    pub trade_ids: Vec<DbId>,
}

/// Body of `PUT /workers/me/availability`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAvailability {
    pub is_available: bool,
}
