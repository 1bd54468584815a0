//! Repository for the `service_requests` table.
//!
//! Status changes go through [`ServiceRequestRepo::transition`], which
//! writes the new status and its dependent fields in one statement guarded
//! by the expected current status.

use chamba_core::geo::Coordinates;
use chamba_core::lifecycle::ServiceStatus;
use chamba_core::service_request::clamp_limit;
use chamba_core::types::DbId;
use sqlx::PgPool;

use crate::models::service_request::{
    ClientRequestSummary, CreateServiceRequest, OpenRequestSummary, RequestListQuery,
    RequestTransition, ServiceRequest,
};
use crate::DbTx;

/// Column list for `service_requests` queries.
const COLUMNS: &str = "\
    id, client_id, worker_id, category_id, title, description, address_text, \
    photo_url, latitude, longitude, scheduled_at, estimated_price, rating, review, \
    status_id, cancelled_by, requested_at, accepted_at, started_at, closed_at, \
    created_at, updated_at";

/// Default page size for per-party listings.
const DEFAULT_LIMIT: i64 = 50;

/// Provides storage for service requests and their lifecycle writes.
pub struct ServiceRequestRepo;

impl ServiceRequestRepo {
    /// Insert a new request in REQUESTED with the given location snapshot.
    pub async fn create(
        pool: &PgPool,
        client_id: DbId,
        input: &CreateServiceRequest,
        location: Coordinates,
    ) -> Result<ServiceRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO service_requests \
                (client_id, category_id, title, description, address_text, photo_url, \
                 latitude, longitude, scheduled_at, estimated_price, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(client_id)
            .bind(input.category_id)
            .bind(input.title.trim())
            .bind(input.description.trim())
            .bind(input.address_text.trim())
            .bind(&input.photo_url)
            .bind(location.latitude)
            .bind(location.longitude)
            .bind(input.scheduled_at)
            .bind(input.estimated_price)
            .bind(ServiceStatus::Requested.id())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ServiceRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM service_requests WHERE id = $1");
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Read the request and hold its row lock until the transaction ends.
    pub async fn lock_for_update(
        tx: &mut DbTx<'_>,
        id: DbId,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM service_requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Read the request under a share lock.
    ///
    /// Concurrent submissions proceed in parallel; acceptance and other
    /// transitions wait until they commit.
    pub async fn lock_for_share(
        tx: &mut DbTx<'_>,
        id: DbId,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM service_requests WHERE id = $1 FOR SHARE");
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Move the request from `from` to `to`, applying `change` in the same
    /// statement.
    ///
    /// Returns `None` when the row is no longer in `from`, leaving it
    /// untouched.
    pub async fn transition(
        tx: &mut DbTx<'_>,
        id: DbId,
        from: ServiceStatus,
        to: ServiceStatus,
        change: &RequestTransition,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        let set_clause = match change {
            RequestTransition::Accept { .. } => {
                "worker_id = $4, estimated_price = $5, accepted_at = NOW()"
            }
            RequestTransition::Start => "started_at = NOW()",
            RequestTransition::Complete { .. } => "rating = $4, review = $5, closed_at = NOW()",
            RequestTransition::Cancel { .. } => "cancelled_by = $4, closed_at = NOW()",
        };
        let query = format!(
            "UPDATE service_requests SET status_id = $3, {set_clause} \
             WHERE id = $1 AND status_id = $2 \
             RETURNING {COLUMNS}"
        );

        let update = sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id());
        let update = match change {
            RequestTransition::Accept { worker_id, price } => update.bind(*worker_id).bind(*price),
            RequestTransition::Start => update,
            RequestTransition::Complete { rating, review } => {
                update.bind(rating.value()).bind(review.clone())
            }
            RequestTransition::Cancel { by } => update.bind(by.as_str()),
        };
        update.fetch_optional(&mut **tx).await
    }

    /// A client's requests, newest first, with category name and proposal
    /// count.
    pub async fn list_by_client(
        pool: &PgPool,
        client_id: DbId,
        params: &RequestListQuery,
    ) -> Result<Vec<ClientRequestSummary>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        sqlx::query_as::<_, ClientRequestSummary>(
            "SELECT r.id, r.title, r.category_id, c.name AS category_name, r.worker_id, \
                    r.status_id, r.estimated_price, r.scheduled_at, r.requested_at, \
                    (SELECT COUNT(*) FROM proposals p \
                     WHERE p.service_request_id = r.id) AS proposal_count \
             FROM service_requests r \
             JOIN categories c ON c.id = r.category_id \
             WHERE r.client_id = $1 \
               AND ($2::SMALLINT IS NULL OR r.status_id = $2) \
             ORDER BY r.requested_at DESC, r.id DESC \
             LIMIT $3 OFFSET $4",
        )
        .bind(client_id)
        .bind(params.status_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Requests bound to a worker, newest first.
    pub async fn list_by_worker(
        pool: &PgPool,
        worker_id: DbId,
        params: &RequestListQuery,
    ) -> Result<Vec<ServiceRequest>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM service_requests \
             WHERE worker_id = $1 \
               AND ($2::SMALLINT IS NULL OR status_id = $2) \
             ORDER BY requested_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(worker_id)
            .bind(params.status_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Requests still taking proposals, newest first.
    pub async fn list_open(
        pool: &PgPool,
        category_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<OpenRequestSummary>, sqlx::Error> {
        sqlx::query_as::<_, OpenRequestSummary>(
            "SELECT r.id, r.client_id, r.category_id, c.name AS category_name, r.title, \
                    r.description, r.address_text, r.photo_url, r.latitude, r.longitude, \
                    r.scheduled_at, r.estimated_price, r.requested_at \
             FROM service_requests r \
             JOIN categories c ON c.id = r.category_id \
             WHERE r.status_id = $1 \
               AND ($2::BIGINT IS NULL OR r.category_id = $2) \
             ORDER BY r.requested_at DESC, r.id DESC \
             LIMIT $3",
        )
        .bind(ServiceStatus::Requested.id())
        .bind(category_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
