//! Request handlers, one module per resource.
//!
//! Handlers authenticate and authorize the caller, then delegate to the
//! [`Marketplace`](chamba_engine::Marketplace) held in [`AppState`](crate::state::AppState).
//! Errors map to HTTP responses through [`AppError`](crate::error::AppError).

pub mod admin;
pub mod categories;
pub mod proposals;
pub mod service_requests;
pub mod workers;
