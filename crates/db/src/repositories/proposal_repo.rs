//! Repository for the `proposals` table.

use chamba_core::types::DbId;
use sqlx::PgPool;

use crate::models::proposal::{Proposal, ProposalWithWorker, SubmitProposal};
use crate::DbTx;

/// Column list for `proposals` queries.
const COLUMNS: &str = "\
    id, service_request_id, worker_id, message, offered_price, is_accepted, created_at";

/// The proposal ledger. Rows are append-only apart from the single
/// false-to-true flip of `is_accepted`.
pub struct ProposalRepo;

impl ProposalRepo {
    /// Insert a proposal inside the caller's transaction.
    pub async fn insert(
        tx: &mut DbTx<'_>,
        request_id: DbId,
        worker_id: DbId,
        input: &SubmitProposal,
    ) -> Result<Proposal, sqlx::Error> {
        let query = format!(
            "INSERT INTO proposals (service_request_id, worker_id, message, offered_price) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(request_id)
            .bind(worker_id)
            .bind(input.message.trim())
            .bind(input.offered_price)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a proposal only if it belongs to `request_id`.
    pub async fn find_for_request(
        tx: &mut DbTx<'_>,
        request_id: DbId,
        proposal_id: DbId,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proposals WHERE id = $1 AND service_request_id = $2"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(proposal_id)
            .bind(request_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Whether `worker_id` already bid on `request_id`.
    pub async fn exists_for_worker(
        tx: &mut DbTx<'_>,
        request_id: DbId,
        worker_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM proposals \
             WHERE service_request_id = $1 AND worker_id = $2)",
        )
        .bind(request_id)
        .bind(worker_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Whether any proposal on the request has been accepted.
    pub async fn has_accepted(tx: &mut DbTx<'_>, request_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM proposals \
             WHERE service_request_id = $1 AND is_accepted)",
        )
        .bind(request_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Flip the acceptance flag. Returns `false` if it was already set.
    pub async fn mark_accepted(tx: &mut DbTx<'_>, proposal_id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE proposals SET is_accepted = TRUE WHERE id = $1 AND NOT is_accepted")
                .bind(proposal_id)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Proposals on a request, cheapest first, with each bidder's rating.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<ProposalWithWorker>, sqlx::Error> {
        sqlx::query_as::<_, ProposalWithWorker>(
            "SELECT p.id, p.service_request_id, p.worker_id, p.message, p.offered_price, \
                    p.is_accepted, p.created_at, \
                    w.rating_average AS worker_rating_average, \
                    w.rating_count AS worker_rating_count, \
                    w.years_experience AS worker_years_experience \
             FROM proposals p \
             JOIN worker_profiles w ON w.user_id = p.worker_id \
             WHERE p.service_request_id = $1 \
             ORDER BY p.offered_price ASC, p.id ASC",
        )
        .bind(request_id)
        .fetch_all(pool)
        .await
    }

    /// Number of accepted proposals on a request (0 or 1).
    pub async fn count_accepted(pool: &PgPool, request_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM proposals WHERE service_request_id = $1 AND is_accepted",
        )
        .bind(request_id)
        .fetch_one(pool)
        .await
    }
}
