//! Service request lifecycle: statuses, events, and the transition table.
//!
//! Every state change a service request can undergo is decided by
//! [`next_status`]. Callers never compare statuses by hand; they ask the
//! table whether `(from, event)` is legal and write the returned status.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

crate::define_status_enum! {
    /// Service request lifecycle status (`service_request_statuses` table).
    ServiceStatus {
        /// Open for proposals.
        Requested = 1 => "REQUESTED",
        /// A proposal was accepted and the worker is bound.
        Accepted = 2 => "ACCEPTED",
        /// The bound worker started the job.
        InProgress = 3 => "IN_PROGRESS",
        /// Closed by the client with a rating. Terminal.
        Completed = 4 => "COMPLETED",
        /// Abandoned by either party. Terminal.
        Cancelled = 5 => "CANCELLED",
    }
}

impl ServiceStatus {
    /// Terminal statuses accept no further mutation.
    pub fn is_terminal(self) -> bool {
        matches!(self, ServiceStatus::Completed | ServiceStatus::Cancelled)
    }

    /// Only open requests take new proposals.
    pub fn accepts_proposals(self) -> bool {
        self == ServiceStatus::Requested
    }
}

/// Which side of a service request is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Client,
    Worker,
}

impl Party {
    pub fn as_str(self) -> &'static str {
        match self {
            Party::Client => "client",
            Party::Worker => "worker",
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that happens to a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    AcceptProposal,
    StartWork,
    Complete,
    Cancel(Party),
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleEvent::AcceptProposal => f.write_str("accept a proposal for"),
            LifecycleEvent::StartWork => f.write_str("start work on"),
            LifecycleEvent::Complete => f.write_str("complete"),
            LifecycleEvent::Cancel(party) => write!(f, "cancel (as {party})"),
        }
    }
}

/// The transition table.
///
/// | From        | Event            | To          |
/// |-------------|------------------|-------------|
/// | REQUESTED   | accept proposal  | ACCEPTED    |
/// | REQUESTED   | client cancels   | CANCELLED   |
/// | ACCEPTED    | either cancels   | CANCELLED   |
/// | ACCEPTED    | worker starts    | IN_PROGRESS |
/// | IN_PROGRESS | client completes | COMPLETED   |
/// | IN_PROGRESS | either cancels   | CANCELLED   |
///
/// Every other pair, including anything from a terminal status, is an
/// [`CoreError::InvalidTransition`].
pub fn next_status(
    from: ServiceStatus,
    event: LifecycleEvent,
) -> Result<ServiceStatus, CoreError> {
    use LifecycleEvent::{AcceptProposal, Cancel, Complete, StartWork};
    use ServiceStatus::{Accepted, Cancelled, Completed, InProgress, Requested};

    match (from, event) {
        (Requested, AcceptProposal) => Ok(Accepted),
        (Requested, Cancel(Party::Client)) => Ok(Cancelled),
        (Accepted, StartWork) => Ok(InProgress),
        (Accepted, Cancel(_)) => Ok(Cancelled),
        (InProgress, Complete) => Ok(Completed),
        (InProgress, Cancel(_)) => Ok(Cancelled),

        (Requested, StartWork | Complete | Cancel(Party::Worker))
        | (Accepted, AcceptProposal | Complete)
        | (InProgress, AcceptProposal | StartWork)
        | (Completed | Cancelled, _) => Err(CoreError::InvalidTransition { from, event }),
    }
}

/// An authenticated caller acting on a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Client(DbId),
    Worker(DbId),
}

impl Actor {
    pub fn party(self) -> Party {
        match self {
            Actor::Client(_) => Party::Client,
            Actor::Worker(_) => Party::Worker,
        }
    }

    pub fn user_id(self) -> DbId {
        match self {
            Actor::Client(id) | Actor::Worker(id) => id,
        }
    }

    /// Verify the actor is a party to a request owned by `client_id` and
    /// bound to `worker_id`.
    pub fn ensure_party(self, client_id: DbId, worker_id: Option<DbId>) -> Result<(), CoreError> {
        let is_party = match self {
            Actor::Client(id) => id == client_id,
            Actor::Worker(id) => worker_id == Some(id),
        };
        if is_party {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "{} {} is not a party to this service request",
                self.party(),
                self.user_id()
            )))
        }
    }
}
