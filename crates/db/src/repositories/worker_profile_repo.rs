//! Repository for the `worker_profiles` and `worker_trades` tables.

use chamba_core::geo::{Coordinates, KM_PER_DEGREE_LATITUDE};
use chamba_core::lifecycle::ServiceStatus;
use chamba_core::rating::RatingAggregate;
use chamba_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{CreateWorkerProfile, WorkerCandidate, WorkerProfile};
use crate::DbTx;

/// Column list for the `worker_profiles` table.
const COLUMNS: &str = "\
    user_id, bio, years_experience, hourly_rate, latitude, longitude, \
    coverage_radius_km, is_available, rating_average, rating_count, \
    created_at, updated_at";

/// Slack added to the latitude band so rounding never drops a worker sitting
/// exactly on the edge of their radius.
const BAND_SLACK_KM: f64 = 0.001;

/// Worker profile reads, availability, trades and the rating aggregate.
pub struct WorkerProfileRepo;

impl WorkerProfileRepo {
    /// Insert a worker profile together with its trade set.
    pub async fn create(
        pool: &PgPool,
        input: &CreateWorkerProfile,
    ) -> Result<WorkerProfile, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO worker_profiles \
                (user_id, bio, years_experience, hourly_rate, latitude, longitude, \
                 coverage_radius_km, is_available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, true)) \
             RETURNING {COLUMNS}"
        );
        let profile = sqlx::query_as::<_, WorkerProfile>(&insert_query)
            .bind(input.user_id)
            .bind(&input.bio)
            .bind(input.years_experience)
            .bind(input.hourly_rate)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.coverage_radius_km)
            .bind(input.is_available)
            .fetch_one(&mut *tx)
            .await?;

        for &category_id in &input.trade_ids {
            sqlx::query("INSERT INTO worker_trades (worker_id, category_id) VALUES ($1, $2)")
                .bind(profile.user_id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(profile)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<WorkerProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM worker_profiles WHERE user_id = $1");
        sqlx::query_as::<_, WorkerProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM worker_profiles WHERE user_id = $1)")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Category ids the worker is registered for, ascending.
    pub async fn trades(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT category_id FROM worker_trades WHERE worker_id = $1 ORDER BY category_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Toggle availability. Returns `None` if the worker does not exist.
    pub async fn set_availability(
        pool: &PgPool,
        user_id: DbId,
        is_available: bool,
    ) -> Result<Option<WorkerProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE worker_profiles SET is_available = $2 WHERE user_id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkerProfile>(&query)
            .bind(user_id)
            .bind(is_available)
            .fetch_optional(pool)
            .await
    }

    /// Cheap prefilter for the matching query.
    ///
    /// Returns available workers holding the trade whose latitude lies
    /// within their own coverage radius of the origin. Great-circle distance
    /// is never shorter than the meridional distance, so this is a superset
    /// of the eligible workers; exact filtering happens in
    /// `chamba_core::matching`.
    pub async fn match_candidates(
        pool: &PgPool,
        category_id: DbId,
        origin: Coordinates,
    ) -> Result<Vec<WorkerCandidate>, sqlx::Error> {
        sqlx::query_as::<_, WorkerCandidate>(
            "SELECT w.user_id, w.latitude, w.longitude, w.coverage_radius_km, \
                    w.is_available, w.rating_average, w.rating_count, \
                    w.hourly_rate, w.years_experience, \
                    ARRAY(SELECT t.category_id FROM worker_trades t \
                          WHERE t.worker_id = w.user_id ORDER BY t.category_id) AS trades \
             FROM worker_profiles w \
             WHERE w.is_available \
               AND EXISTS (SELECT 1 FROM worker_trades wt \
                           WHERE wt.worker_id = w.user_id AND wt.category_id = $1) \
               AND ABS(w.latitude - $2) * $3 <= w.coverage_radius_km + $4",
        )
        .bind(category_id)
        .bind(origin.latitude)
        .bind(KM_PER_DEGREE_LATITUDE)
        .bind(BAND_SLACK_KM)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Rating aggregate (transaction-scoped)
    // -----------------------------------------------------------------------

    /// Lock the worker row and read its current aggregate.
    ///
    /// Callers must already hold the request row lock (request, then worker).
    /// `NO KEY UPDATE` leaves foreign-key checks from new proposals by the
    /// same worker unblocked.
    pub async fn lock_rating(
        tx: &mut DbTx<'_>,
        user_id: DbId,
    ) -> Result<Option<RatingAggregate>, sqlx::Error> {
        let row: Option<(f64, i32)> = sqlx::query_as(
            "SELECT rating_average, rating_count FROM worker_profiles \
             WHERE user_id = $1 FOR NO KEY UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.map(|(average, count)| RatingAggregate { average, count }))
    }

    /// Write a new aggregate to a row locked by [`Self::lock_rating`].
    pub async fn store_rating(
        tx: &mut DbTx<'_>,
        user_id: DbId,
        aggregate: RatingAggregate,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE worker_profiles SET rating_average = $2, rating_count = $3 \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(aggregate.average)
        .bind(aggregate.count)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Recompute the aggregate from the ratings stored on the worker's
    /// completed requests. Returns `None` if the worker does not exist.
    pub async fn reconcile_rating(
        tx: &mut DbTx<'_>,
        user_id: DbId,
    ) -> Result<Option<RatingAggregate>, sqlx::Error> {
        let row: Option<(f64, i32)> = sqlx::query_as(
            "UPDATE worker_profiles w \
             SET rating_average = s.average, rating_count = s.count \
             FROM ( \
                 SELECT COALESCE(AVG(rating), 0)::DOUBLE PRECISION AS average, \
                        COUNT(rating)::INTEGER AS count \
                 FROM service_requests \
                 WHERE worker_id = $1 AND status_id = $2 AND rating IS NOT NULL \
             ) s \
             WHERE w.user_id = $1 \
             RETURNING w.rating_average, w.rating_count",
        )
        .bind(user_id)
        .bind(ServiceStatus::Completed.id())
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.map(|(average, count)| RatingAggregate { average, count }))
    }
}
