//! The [`Marketplace`] service and its shared plumbing.
//!
//! Operations are grouped by the entity they write:
//! - [`requests`] -- creation and lifecycle transitions of service requests
//! - [`proposals`] -- the proposal ledger and acceptance
//! - [`workers`] -- matching, availability and the rating aggregate

mod proposals;
mod requests;
mod workers;

use std::sync::Arc;

use chamba_core::error::CoreError;
use chamba_core::types::DbId;
use chamba_db::models::category::Category;
use chamba_db::models::service_request::ServiceRequest;
use chamba_db::repositories::{CategoryRepo, ServiceRequestRepo};
use chamba_db::{DbPool, DbTx};
use chamba_events::{EventBus, MarketplaceEvent};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Entity name used in errors about service requests.
pub(crate) const SERVICE_REQUEST: &str = "service_request";

/// Entry point for every marketplace operation.
///
/// Cheap to share behind an `Arc`; holds the pool, the event bus and the
/// engine configuration.
pub struct Marketplace {
    pool: DbPool,
    event_bus: Arc<EventBus>,
    config: EngineConfig,
}

impl Marketplace {
    pub fn new(pool: DbPool, event_bus: Arc<EventBus>, config: EngineConfig) -> Self {
        Self {
            pool,
            event_bus,
            config,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open a write transaction bounded by the configured lock timeout.
    async fn begin(&self) -> Result<DbTx<'static>, EngineError> {
        let mut tx = self.pool.begin().await?;
        // SET does not take bind parameters; the value is a plain integer.
        let statement = format!("SET LOCAL lock_timeout = '{}ms'", self.config.lock_timeout_ms);
        sqlx::query(&statement).execute(&mut *tx).await?;
        Ok(tx)
    }

    /// Publish after commit. Never called with a transaction open.
    fn publish(&self, event: MarketplaceEvent) {
        self.event_bus.publish(event);
    }

    // -----------------------------------------------------------------------
    // Shared reads
    // -----------------------------------------------------------------------

    pub async fn list_categories(&self) -> Result<Vec<Category>, EngineError> {
        Ok(CategoryRepo::list(&self.pool).await?)
    }

    /// Fetch a request or fail with `NotFound`.
    pub async fn get_request(&self, request_id: DbId) -> Result<ServiceRequest, EngineError> {
        ServiceRequestRepo::find_by_id(&self.pool, request_id)
            .await?
            .ok_or_else(|| request_not_found(request_id).into())
    }

    /// Fetch a request the caller owns as its client.
    pub async fn request_owned_by(
        &self,
        request_id: DbId,
        client_id: DbId,
    ) -> Result<ServiceRequest, EngineError> {
        let request = self.get_request(request_id).await?;
        if request.client_id != client_id {
            return Err(CoreError::Forbidden(format!(
                "Service request {request_id} belongs to another client"
            ))
            .into());
        }
        Ok(request)
    }

    /// Fetch a request visible to the caller: its client, its bound worker,
    /// or an administrator.
    pub async fn request_visible_to(
        &self,
        request_id: DbId,
        user_id: DbId,
        is_admin: bool,
    ) -> Result<ServiceRequest, EngineError> {
        let request = self.get_request(request_id).await?;
        if !is_admin && !request.is_party(user_id) {
            return Err(CoreError::Forbidden(format!(
                "User {user_id} is not a party to service request {request_id}"
            ))
            .into());
        }
        Ok(request)
    }
}

pub(crate) fn request_not_found(request_id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: SERVICE_REQUEST,
        id: request_id,
    }
}

/// The guarded `UPDATE` matched no row: another transaction moved the
/// request first.
pub(crate) fn request_moved(request_id: DbId) -> CoreError {
    CoreError::ConcurrentModification {
        entity: SERVICE_REQUEST,
        id: request_id,
    }
}
