//! Service request creation, lifecycle transitions and listings.

use chamba_core::error::CoreError;
use chamba_core::geo::Coordinates;
use chamba_core::lifecycle::{next_status, Actor, LifecycleEvent};
use chamba_core::rating::{validate_review, Rating};
use chamba_core::service_request::{clamp_limit, validate_request_fields};
use chamba_core::types::DbId;
use chamba_db::models::service_request::{
    ClientRequestSummary, CreateServiceRequest, FeedQuery, OpenRequestSummary, RequestListQuery,
    RequestTransition, ServiceRequest,
};
use chamba_db::repositories::{
    CategoryRepo, ClientProfileRepo, ServiceRequestRepo, WorkerProfileRepo,
};
use chamba_events::{EventKind, MarketplaceEvent};

use super::{request_moved, request_not_found, Marketplace, SERVICE_REQUEST};
use crate::error::EngineError;
use crate::retry::with_retry;

impl Marketplace {
    /// Open a new request in REQUESTED.
    ///
    /// The location is taken from the input when given, otherwise
    /// snapshotted from the client's profile.
    pub async fn create_request(
        &self,
        client_id: DbId,
        input: &CreateServiceRequest,
    ) -> Result<ServiceRequest, EngineError> {
        validate_request_fields(
            &input.title,
            &input.description,
            &input.address_text,
            input.estimated_price,
        )?;

        if CategoryRepo::find_by_id(&self.pool, input.category_id)
            .await?
            .is_none()
        {
            return Err(CoreError::InvalidCategory(input.category_id).into());
        }

        let client = ClientProfileRepo::find_by_id(&self.pool, client_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "client_profile",
                id: client_id,
            })?;

        let location = match (input.latitude, input.longitude) {
            (Some(latitude), Some(longitude)) => Coordinates::new(latitude, longitude)?,
            (None, None) => client.location().ok_or_else(|| {
                CoreError::Validation(
                    "No location given and the client profile has none on file".to_string(),
                )
            })?,
            _ => {
                return Err(CoreError::Validation(
                    "Latitude and longitude must be given together".to_string(),
                )
                .into())
            }
        };

        let request =
            ServiceRequestRepo::create(&self.pool, client_id, input, location).await?;

        tracing::info!(
            request_id = request.id,
            client_id,
            category_id = request.category_id,
            "Service request created",
        );
        self.publish(
            MarketplaceEvent::new(EventKind::RequestCreated)
                .with_request(request.id)
                .with_actor(client_id)
                .with_payload(serde_json::json!({ "category_id": request.category_id })),
        );
        Ok(request)
    }

    /// ACCEPTED -> IN_PROGRESS, by the bound worker only.
    pub async fn start_work(
        &self,
        request_id: DbId,
        worker_id: DbId,
    ) -> Result<ServiceRequest, EngineError> {
        let request = with_retry(&self.config, SERVICE_REQUEST, request_id, || {
            self.try_start_work(request_id, worker_id)
        })
        .await?;

        tracing::info!(request_id, worker_id, "Work started");
        self.publish(
            MarketplaceEvent::new(EventKind::WorkStarted)
                .with_request(request_id)
                .with_worker(worker_id)
                .with_actor(worker_id),
        );
        Ok(request)
    }

    async fn try_start_work(
        &self,
        request_id: DbId,
        worker_id: DbId,
    ) -> Result<ServiceRequest, EngineError> {
        let mut tx = self.begin().await?;
        let request = ServiceRequestRepo::lock_for_update(&mut tx, request_id)
            .await?
            .ok_or_else(|| request_not_found(request_id))?;
        let from = request.status()?;
        let to = next_status(from, LifecycleEvent::StartWork)?;
        Actor::Worker(worker_id).ensure_party(request.client_id, request.worker_id)?;

        let updated =
            ServiceRequestRepo::transition(&mut tx, request_id, from, to, &RequestTransition::Start)
                .await?
                .ok_or_else(|| request_moved(request_id))?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Cancel a request on behalf of one of its parties.
    ///
    /// A client may cancel from REQUESTED, ACCEPTED or IN_PROGRESS; the
    /// bound worker from ACCEPTED or IN_PROGRESS.
    pub async fn cancel(&self, request_id: DbId, actor: Actor) -> Result<ServiceRequest, EngineError> {
        let request = with_retry(&self.config, SERVICE_REQUEST, request_id, || {
            self.try_cancel(request_id, actor)
        })
        .await?;

        tracing::info!(
            request_id,
            cancelled_by = %actor.party(),
            user_id = actor.user_id(),
            "Service request cancelled",
        );
        let mut event = MarketplaceEvent::new(EventKind::RequestCancelled)
            .with_request(request_id)
            .with_actor(actor.user_id())
            .with_payload(serde_json::json!({ "cancelled_by": actor.party().as_str() }));
        if let Some(worker_id) = request.worker_id {
            event = event.with_worker(worker_id);
        }
        self.publish(event);
        Ok(request)
    }

    async fn try_cancel(&self, request_id: DbId, actor: Actor) -> Result<ServiceRequest, EngineError> {
        let mut tx = self.begin().await?;
        let request = ServiceRequestRepo::lock_for_update(&mut tx, request_id)
            .await?
            .ok_or_else(|| request_not_found(request_id))?;
        actor.ensure_party(request.client_id, request.worker_id)?;
        let from = request.status()?;
        let to = next_status(from, LifecycleEvent::Cancel(actor.party()))?;

        let change = RequestTransition::Cancel { by: actor.party() };
        let updated = ServiceRequestRepo::transition(&mut tx, request_id, from, to, &change)
            .await?
            .ok_or_else(|| request_moved(request_id))?;
        tx.commit().await?;
        Ok(updated)
    }

    /// IN_PROGRESS -> COMPLETED with the client's rating.
    ///
    /// The rating is folded into the worker's aggregate in the same
    /// transaction, so it is counted exactly once.
    pub async fn complete(
        &self,
        request_id: DbId,
        rating: i16,
        review: Option<String>,
    ) -> Result<ServiceRequest, EngineError> {
        let rating = Rating::new(rating)?;
        let review = review
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if let Some(text) = &review {
            validate_review(text)?;
        }

        let request = with_retry(&self.config, SERVICE_REQUEST, request_id, || {
            self.try_complete(request_id, rating, review.clone())
        })
        .await?;

        let worker_id = request.worker_id.unwrap_or_default();
        tracing::info!(request_id, worker_id, rating = rating.value(), "Service request completed");
        self.publish(
            MarketplaceEvent::new(EventKind::RequestCompleted)
                .with_request(request_id)
                .with_worker(worker_id)
                .with_actor(request.client_id)
                .with_payload(serde_json::json!({ "rating": rating.value() })),
        );
        self.publish(
            MarketplaceEvent::new(EventKind::WorkerRated)
                .with_request(request_id)
                .with_worker(worker_id)
                .with_payload(serde_json::json!({ "rating": rating.value() })),
        );
        Ok(request)
    }

    async fn try_complete(
        &self,
        request_id: DbId,
        rating: Rating,
        review: Option<String>,
    ) -> Result<ServiceRequest, EngineError> {
        let mut tx = self.begin().await?;
        let request = ServiceRequestRepo::lock_for_update(&mut tx, request_id)
            .await?
            .ok_or_else(|| request_not_found(request_id))?;
        let from = request.status()?;
        let to = next_status(from, LifecycleEvent::Complete)?;
        let worker_id = request.worker_id.ok_or_else(|| {
            CoreError::Internal(format!("Service request {request_id} is {from} without a worker"))
        })?;

        // Request row first, then worker row.
        let aggregate = WorkerProfileRepo::lock_rating(&mut tx, worker_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "worker_profile",
                id: worker_id,
            })?;

        let change = RequestTransition::Complete { rating, review };
        let updated = ServiceRequestRepo::transition(&mut tx, request_id, from, to, &change)
            .await?
            .ok_or_else(|| request_moved(request_id))?;
        WorkerProfileRepo::store_rating(&mut tx, worker_id, aggregate.record(rating)).await?;

        tx.commit().await?;
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Listings
    // -----------------------------------------------------------------------

    pub async fn list_client_requests(
        &self,
        client_id: DbId,
        params: &RequestListQuery,
    ) -> Result<Vec<ClientRequestSummary>, EngineError> {
        Ok(ServiceRequestRepo::list_by_client(&self.pool, client_id, params).await?)
    }

    /// Requests still open for proposals, newest first.
    pub async fn open_feed(&self, params: &FeedQuery) -> Result<Vec<OpenRequestSummary>, EngineError> {
        let limit = clamp_limit(params.limit, self.config.feed_default_limit);
        Ok(ServiceRequestRepo::list_open(&self.pool, params.category_id, limit).await?)
    }
}
