// src/db/category_repository.rs

use crate::errors::SiteError;
use crate::models::Category;
use sqlx::PgPool;

pub struct CategoryRepository;

impl CategoryRepository {
    /// All place types, ordered by code
    pub async fn list(pool: &PgPool) -> Result<Vec<Category>, SiteError> {
        sqlx::query_as::<_, Category>("SELECT code, name FROM place_types ORDER BY code")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list place types: {}", e);
                SiteError::DatabaseError(e.to_string())
            })
    }
}
