//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Plain
//! reads take `&PgPool`; the lock-and-update primitives used by the engine
//! take the caller's open transaction so they commit or roll back together.

pub mod category_repo;
pub mod client_profile_repo;
pub mod proposal_repo;
pub mod service_request_repo;
pub mod worker_profile_repo;

pub use category_repo::CategoryRepo;
pub use client_profile_repo::ClientProfileRepo;
pub use proposal_repo::ProposalRepo;
pub use service_request_repo::ServiceRequestRepo;
pub use worker_profile_repo::WorkerProfileRepo;
