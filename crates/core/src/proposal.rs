//! Proposal ledger rules: what may be submitted and when one may be accepted.

use crate::error::CoreError;
use crate::lifecycle::{next_status, LifecycleEvent, ServiceStatus};
use crate::types::DbId;

/// Maximum length of the message a worker attaches to a proposal.
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Upper bound for an offered or estimated price.
pub const MAX_PRICE: f64 = 10_000_000.0;

/// Validate a proposal message.
pub fn validate_message(message: &str) -> Result<(), CoreError> {
    if message.trim().is_empty() {
        return Err(CoreError::Validation(
            "Proposal message must not be empty".to_string(),
        ));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(CoreError::Validation(format!(
            "Proposal message must not exceed {MAX_MESSAGE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a monetary amount. `field` names the amount in the error.
pub fn validate_price(price: f64, field: &str) -> Result<(), CoreError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a non-negative amount, got {price}"
        )));
    }
    if price > MAX_PRICE {
        return Err(CoreError::Validation(format!(
            "{field} must not exceed {MAX_PRICE}"
        )));
    }
    Ok(())
}

/// Check that a request in `status` still takes proposals.
pub fn ensure_open_for_proposals(request_id: DbId, status: ServiceStatus) -> Result<(), CoreError> {
    if status.accepts_proposals() {
        Ok(())
    } else {
        Err(CoreError::RequestClosed { request_id, status })
    }
}

/// Decide whether a proposal may be accepted on a request.
///
/// A request that already carries an accepted proposal reports
/// [`CoreError::AlreadyAccepted`] whatever its current status; otherwise the
/// lifecycle table decides (only REQUESTED may accept).
pub fn check_acceptance(
    request_id: DbId,
    status: ServiceStatus,
    has_accepted_proposal: bool,
) -> Result<ServiceStatus, CoreError> {
    if has_accepted_proposal {
        return Err(CoreError::AlreadyAccepted { request_id });
    }
    next_status(status, LifecycleEvent::AcceptProposal)
}
