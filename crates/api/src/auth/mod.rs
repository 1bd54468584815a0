//! Validation of access tokens issued by the identity service.

pub mod jwt;
