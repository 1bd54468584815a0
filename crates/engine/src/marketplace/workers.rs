//! Worker-facing operations: matching, availability, jobs and ratings.

use chamba_core::error::CoreError;
use chamba_core::geo::Coordinates;
use chamba_core::matching::{eligible_workers, Candidate, MatchWindow, WorkerSummary};
use chamba_core::rating::RatingAggregate;
use chamba_core::types::DbId;
use chamba_db::models::profile::WorkerProfile;
use chamba_db::models::service_request::{RequestListQuery, ServiceRequest};
use chamba_db::repositories::{CategoryRepo, ServiceRequestRepo, WorkerProfileRepo};
use chamba_events::{EventKind, MarketplaceEvent};

use super::Marketplace;
use crate::error::EngineError;
use crate::retry::with_retry;

const WORKER_PROFILE: &str = "worker_profile";

fn worker_not_found(worker_id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: WORKER_PROFILE,
        id: worker_id,
    }
}

impl Marketplace {
    /// Available workers with the trade whose coverage reaches `origin`,
    /// nearest first. The default window returns every eligible worker.
    ///
    /// Takes no locks; results reflect committed state at query time.
    pub async fn find_eligible_workers(
        &self,
        category_id: DbId,
        origin: Coordinates,
        window: MatchWindow,
    ) -> Result<Vec<WorkerSummary>, EngineError> {
        origin.validate()?;
        if CategoryRepo::find_by_id(&self.pool, category_id)
            .await?
            .is_none()
        {
            return Err(CoreError::InvalidCategory(category_id).into());
        }

        let rows = WorkerProfileRepo::match_candidates(&self.pool, category_id, origin).await?;
        let prefiltered = rows.len();
        let matches = eligible_workers(
            rows.into_iter().map(Candidate::from),
            category_id,
            origin,
            window,
        );

        tracing::debug!(
            category_id,
            latitude = origin.latitude,
            longitude = origin.longitude,
            prefiltered,
            matched = matches.len(),
            "Matching query",
        );
        Ok(matches)
    }

    pub async fn set_availability(
        &self,
        worker_id: DbId,
        is_available: bool,
    ) -> Result<WorkerProfile, EngineError> {
        let profile = WorkerProfileRepo::set_availability(&self.pool, worker_id, is_available)
            .await?
            .ok_or_else(|| worker_not_found(worker_id))?;

        tracing::info!(worker_id, is_available, "Worker availability changed");
        self.publish(
            MarketplaceEvent::new(EventKind::AvailabilityChanged)
                .with_worker(worker_id)
                .with_actor(worker_id)
                .with_payload(serde_json::json!({ "is_available": is_available })),
        );
        Ok(profile)
    }

    /// Requests bound to the worker, newest first.
    pub async fn list_worker_jobs(
        &self,
        worker_id: DbId,
        params: &RequestListQuery,
    ) -> Result<Vec<ServiceRequest>, EngineError> {
        Ok(ServiceRequestRepo::list_by_worker(&self.pool, worker_id, params).await?)
    }

    /// Rebuild a worker's rating aggregate from the ratings stored on their
    /// completed requests. Requests themselves are not touched.
    pub async fn reconcile_rating(
        &self,
        worker_id: DbId,
        admin_id: DbId,
    ) -> Result<RatingAggregate, EngineError> {
        let aggregate = with_retry(&self.config, WORKER_PROFILE, worker_id, || {
            self.try_reconcile_rating(worker_id)
        })
        .await?;

        tracing::info!(
            worker_id,
            admin_id,
            average = aggregate.average,
            count = aggregate.count,
            "Worker rating reconciled",
        );
        self.publish(
            MarketplaceEvent::new(EventKind::RatingReconciled)
                .with_worker(worker_id)
                .with_actor(admin_id)
                .with_payload(serde_json::json!({
                    "average": aggregate.average,
                    "count": aggregate.count,
                })),
        );
        Ok(aggregate)
    }

    async fn try_reconcile_rating(&self, worker_id: DbId) -> Result<RatingAggregate, EngineError> {
        let mut tx = self.begin().await?;
        // Wait out any completion holding the row, then recompute from a
        // fresh snapshot.
        WorkerProfileRepo::lock_rating(&mut tx, worker_id)
            .await?
            .ok_or_else(|| worker_not_found(worker_id))?;
        let aggregate = WorkerProfileRepo::reconcile_rating(&mut tx, worker_id)
            .await?
            .ok_or_else(|| worker_not_found(worker_id))?;
        tx.commit().await?;
        Ok(aggregate)
    }
}
