//! Trade catalog models.

use serde::Serialize;
use sqlx::FromRow;
use chamba_core::types::{DbId, Timestamp};

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub icon_url: Option<String>,
    pub created_at: Timestamp,
}
