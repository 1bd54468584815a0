//! Marketplace domain events.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`MarketplaceEvent`] -- the envelope published after every committed
//!   lifecycle change.
//! - [`EventRelay`] -- background task that forwards events to the log.

pub mod bus;
pub mod relay;

pub use bus::{EventBus, EventKind, MarketplaceEvent};
pub use relay::EventRelay;
