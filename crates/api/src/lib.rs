//! HTTP surface of the marketplace engine.
//!
//! Handlers authenticate the caller from an externally issued JWT, enforce
//! role and ownership rules, then delegate to [`chamba_engine::Marketplace`].

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
