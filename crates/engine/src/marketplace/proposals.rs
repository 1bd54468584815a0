//! The proposal ledger: submission, acceptance and listing.

use chamba_core::error::CoreError;
use chamba_core::lifecycle::ServiceStatus;
use chamba_core::proposal::{
    check_acceptance, ensure_open_for_proposals, validate_message, validate_price,
};
use chamba_core::types::DbId;
use chamba_db::models::proposal::{Proposal, ProposalWithWorker, SubmitProposal};
use chamba_db::models::service_request::{RequestTransition, ServiceRequest};
use chamba_db::repositories::{ProposalRepo, ServiceRequestRepo, WorkerProfileRepo};
use chamba_events::{EventKind, MarketplaceEvent};

use super::{request_moved, request_not_found, Marketplace, SERVICE_REQUEST};
use crate::error::EngineError;
use crate::retry::with_retry;

/// Unique constraint allowing one proposal per worker and request.
const UQ_REQUEST_WORKER: &str = "uq_proposals_request_worker";

impl Marketplace {
    /// Record a worker's bid on a request that is still REQUESTED.
    pub async fn submit_proposal(
        &self,
        request_id: DbId,
        worker_id: DbId,
        input: &SubmitProposal,
    ) -> Result<Proposal, EngineError> {
        validate_message(&input.message)?;
        validate_price(input.offered_price, "Offered price")?;

        if !WorkerProfileRepo::exists(&self.pool, worker_id).await? {
            return Err(CoreError::NotFound {
                entity: "worker_profile",
                id: worker_id,
            }
            .into());
        }

        let proposal = with_retry(&self.config, SERVICE_REQUEST, request_id, || {
            self.try_submit_proposal(request_id, worker_id, input)
        })
        .await?;

        tracing::info!(
            request_id,
            worker_id,
            proposal_id = proposal.id,
            offered_price = proposal.offered_price,
            "Proposal submitted",
        );
        self.publish(
            MarketplaceEvent::new(EventKind::ProposalSubmitted)
                .with_request(request_id)
                .with_worker(worker_id)
                .with_actor(worker_id)
                .with_payload(serde_json::json!({
                    "proposal_id": proposal.id,
                    "offered_price": proposal.offered_price,
                })),
        );
        Ok(proposal)
    }

    async fn try_submit_proposal(
        &self,
        request_id: DbId,
        worker_id: DbId,
        input: &SubmitProposal,
    ) -> Result<Proposal, EngineError> {
        let duplicate = || CoreError::DuplicateProposal {
            request_id,
            worker_id,
        };

        let mut tx = self.begin().await?;
        // Shared lock: submissions run side by side, acceptance waits.
        let request = ServiceRequestRepo::lock_for_share(&mut tx, request_id)
            .await?
            .ok_or_else(|| request_not_found(request_id))?;
        ensure_open_for_proposals(request_id, request.status()?)?;

        if ProposalRepo::exists_for_worker(&mut tx, request_id, worker_id).await? {
            return Err(duplicate().into());
        }

        let proposal = match ProposalRepo::insert(&mut tx, request_id, worker_id, input).await {
            Ok(proposal) => proposal,
            Err(err) => {
                let err = EngineError::from(err);
                return Err(if err.violates(UQ_REQUEST_WORKER) {
                    duplicate().into()
                } else {
                    err
                });
            }
        };
        tx.commit().await?;
        Ok(proposal)
    }

    /// Accept `proposal_id`, binding its worker and moving the request to
    /// ACCEPTED in one transaction.
    ///
    /// The other proposals stay as they are. A request that already has an
    /// accepted proposal fails with `AlreadyAccepted`.
    pub async fn accept_proposal(
        &self,
        request_id: DbId,
        proposal_id: DbId,
    ) -> Result<ServiceRequest, EngineError> {
        let request = with_retry(&self.config, SERVICE_REQUEST, request_id, || {
            self.try_accept_proposal(request_id, proposal_id)
        })
        .await?;

        let worker_id = request.worker_id.unwrap_or_default();
        tracing::info!(request_id, proposal_id, worker_id, "Proposal accepted");
        self.publish(
            MarketplaceEvent::new(EventKind::ProposalAccepted)
                .with_request(request_id)
                .with_worker(worker_id)
                .with_actor(request.client_id)
                .with_payload(serde_json::json!({
                    "proposal_id": proposal_id,
                    "price": request.estimated_price,
                })),
        );
        Ok(request)
    }

    async fn try_accept_proposal(
        &self,
        request_id: DbId,
        proposal_id: DbId,
    ) -> Result<ServiceRequest, EngineError> {
        let mut tx = self.begin().await?;
        let request = ServiceRequestRepo::lock_for_update(&mut tx, request_id)
            .await?
            .ok_or_else(|| request_not_found(request_id))?;
        let proposal = ProposalRepo::find_for_request(&mut tx, request_id, proposal_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "proposal",
                id: proposal_id,
            })?;

        let from = request.status()?;
        let has_accepted = ProposalRepo::has_accepted(&mut tx, request_id).await?;
        let to = check_acceptance(request_id, from, has_accepted)?;
        debug_assert_eq!(from, ServiceStatus::Requested);

        if !ProposalRepo::mark_accepted(&mut tx, proposal.id).await? {
            return Err(CoreError::AlreadyAccepted { request_id }.into());
        }

        let change = RequestTransition::Accept {
            worker_id: proposal.worker_id,
            price: proposal.offered_price,
        };
        let updated = ServiceRequestRepo::transition(&mut tx, request_id, from, to, &change)
            .await?
            .ok_or_else(|| request_moved(request_id))?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Proposals on a request, cheapest first.
    pub async fn list_proposals(
        &self,
        request_id: DbId,
    ) -> Result<Vec<ProposalWithWorker>, EngineError> {
        if ServiceRequestRepo::find_by_id(&self.pool, request_id)
            .await?
            .is_none()
        {
            return Err(request_not_found(request_id).into());
        }
        Ok(ProposalRepo::list_for_request(&self.pool, request_id).await?)
    }
}
