//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` input DTOs for the operations that write it

pub mod category;
pub mod profile;
pub mod proposal;
pub mod service_request;
