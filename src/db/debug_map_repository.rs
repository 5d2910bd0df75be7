// src/db/debug_map_repository.rs
// DOCUMENTATION: Storage for rendered diagnostic maps

use crate::errors::SiteError;
use crate::models::{DebugMap, GeoPoint};
use crate::services::ArtifactSink;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgDebugMapRepository {
    pool: PgPool,
}

impl PgDebugMapRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a stored map by id
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<DebugMap, SiteError> {
        sqlx::query_as::<_, DebugMap>(
            r#"
            SELECT id, user_lat, user_lon, map_html, created_at
            FROM debug_maps
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching debug map: {}", e);
            SiteError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| {
            log::warn!("Debug map not found: {}", id);
            SiteError::NotFound(id.to_string())
        })
    }
}

impl ArtifactSink for PgDebugMapRepository {
    async fn store(&self, user: &GeoPoint, map_html: &str) -> Result<Uuid, SiteError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO debug_maps (id, user_lat, user_lon, map_html, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4()) // $1
        .bind(user.latitude) // $2
        .bind(user.longitude) // $3
        .bind(map_html) // $4
        .fetch_one(&self.pool)
        .await
        .map_err(|e| SiteError::DatabaseError(e.to_string()))?;

        Ok(id)
    }
}
