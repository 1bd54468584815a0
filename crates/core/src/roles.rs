//! Well-known role name constants.
//!
//! These are the `role` claim values issued by the external identity
//! service. The engine never creates users; it only reads the role.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CLIENT: &str = "client";
pub const ROLE_WORKER: &str = "worker";
