//! Repository for the `client_profiles` table.

use chamba_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{ClientProfile, CreateClientProfile};

/// Column list for `client_profiles` queries.
const COLUMNS: &str = "\
    user_id, street, neighborhood, exterior_number, interior_number, \
    postal_code, city, address_notes, latitude, longitude, created_at, updated_at";

/// Client profiles are owned by the user-management service; the engine
/// only reads them.
pub struct ClientProfileRepo;

impl ClientProfileRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateClientProfile,
    ) -> Result<ClientProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO client_profiles \
                (user_id, street, neighborhood, exterior_number, interior_number, \
                 postal_code, city, address_notes, latitude, longitude) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClientProfile>(&query)
            .bind(input.user_id)
            .bind(&input.street)
            .bind(&input.neighborhood)
            .bind(&input.exterior_number)
            .bind(&input.interior_number)
            .bind(&input.postal_code)
            .bind(&input.city)
            .bind(&input.address_notes)
            .bind(input.latitude)
            .bind(input.longitude)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<ClientProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM client_profiles WHERE user_id = $1");
        sqlx::query_as::<_, ClientProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
