//! Domain rules for the home-services marketplace.
//!
//! Pure types and functions with no I/O, shared by the database, engine and
//! API crates:
//!
//! - [`lifecycle`] -- service request statuses and the transition table.
//! - [`proposal`] -- proposal validation and the acceptance guard.
//! - [`rating`] -- closing ratings and the running worker aggregate.
//! - [`geo`] / [`matching`] -- haversine distance and worker eligibility.

pub mod error;
pub mod geo;
pub mod lifecycle;
pub mod matching;
pub mod proposal;
pub mod rating;
pub mod roles;
pub mod service_request;
pub mod status;
pub mod types;
