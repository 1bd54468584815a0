use crate::lifecycle::{LifecycleEvent, ServiceStatus};
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Invalid transition: cannot {event} a request that is {from}")]
    InvalidTransition {
        from: ServiceStatus,
        event: LifecycleEvent,
    },

    #[error("Service request {request_id} already has an accepted proposal")]
    AlreadyAccepted { request_id: DbId },

    #[error("Service request {request_id} is {status} and no longer takes proposals")]
    RequestClosed {
        request_id: DbId,
        status: ServiceStatus,
    },

    #[error("Invalid rating {0}: must be between 1 and 5")]
    InvalidRating(i16),

    #[error("Unknown category id {0}")]
    InvalidCategory(DbId),

    #[error("Worker {worker_id} already submitted a proposal for service request {request_id}")]
    DuplicateProposal { request_id: DbId, worker_id: DbId },

    #[error("Concurrent modification of {entity} {id}; retry the operation")]
    ConcurrentModification { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the whole operation may be retried from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::ConcurrentModification { .. })
    }
}
