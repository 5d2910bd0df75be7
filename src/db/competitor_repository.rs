// src/db/competitor_repository.rs
// DOCUMENTATION: Read-only access to competitor locations
// PURPOSE: Resolve a category code into the set of existing places

use crate::errors::SiteError;
use crate::models::GeoPoint;
use sqlx::{FromRow, PgPool};

/// Source of competitor locations for a category
#[allow(async_fn_in_trait)]
pub trait CompetitorSource {
    /// All known locations tagged with `category`; empty when none match
    async fn fetch(&self, category: &str) -> Result<Vec<GeoPoint>, SiteError>;
}

/// Internal struct for mapping database rows
/// DOCUMENTATION: Handles PostGIS POINT extraction via ST_X() and ST_Y()
#[derive(Debug, FromRow)]
struct CompetitorRow {
    pub latitude: f64,  // From ST_Y(geom)
    pub longitude: f64, // From ST_X(geom)
}

/// PostGIS-backed competitor repository
#[derive(Clone)]
pub struct PgCompetitorRepository {
    pool: PgPool,
}

impl PgCompetitorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CompetitorSource for PgCompetitorRepository {
    async fn fetch(&self, category: &str) -> Result<Vec<GeoPoint>, SiteError> {
        let rows = sqlx::query_as::<_, CompetitorRow>(
            r#"
            SELECT ST_Y(p.geom) AS latitude, ST_X(p.geom) AS longitude
            FROM places p
            JOIN place_types t ON p.type_id = t.id
            WHERE t.code = $1
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch competitors for '{}': {}", category, e);
            SiteError::DatabaseError(e.to_string())
        })?;

        log::info!("Found {} competitors for type '{}'", rows.len(), category);

        Ok(rows
            .into_iter()
            .map(|r| GeoPoint {
                latitude: r.latitude,
                longitude: r.longitude,
            })
            .collect())
    }
}
