//! The marketplace engine.
//!
//! [`Marketplace`] runs every write as one Postgres transaction: lock the
//! service request row, validate against `chamba_core`, apply the change in
//! a single guarded `UPDATE`, commit, then publish a
//! [`MarketplaceEvent`](chamba_events::MarketplaceEvent). Contention is
//! retried a bounded number of times before it reaches the caller.

pub mod config;
pub mod error;
pub mod marketplace;
mod retry;

pub use config::EngineConfig;
pub use error::EngineError;
pub use marketplace::Marketplace;
