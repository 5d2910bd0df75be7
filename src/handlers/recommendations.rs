// src/handlers/recommendations.rs
// DOCUMENTATION: HTTP handlers for site recommendations
// PURPOSE: Parse requests, run the site finder, return the outcome

use crate::config::{AreaBackendKind, Config};
use crate::db::{PgCompetitorRepository, PgDebugMapRepository};
use crate::errors::SiteError;
use crate::models::{GeoPoint, RecommendationRequest};
use crate::services::{
    AreaBackend, GeodesicAreaBuilder, MapReporter, OverpassClient, PostgisAreaBuilder,
    SearchSettings, SiteFinder,
};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// POST /recommendations
/// Recommend a location for a new business of the requested category
pub async fn recommend(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    roads: web::Data<OverpassClient>,
    req: web::Json<RecommendationRequest>,
) -> Result<impl Responder, SiteError> {
    // Validate request
    if let Err(e) = req.validate() {
        return Err(SiteError::ValidationError(e.to_string()));
    }

    let req = req.into_inner();
    let user = GeoPoint::new(req.latitude, req.longitude)?;

    let area_backend = match config.area_backend_kind() {
        Ok(AreaBackendKind::Postgis) => {
            AreaBackend::Postgis(PostgisAreaBuilder::new(pool.get_ref().clone()))
        }
        Ok(AreaBackendKind::Local) => AreaBackend::Local(GeodesicAreaBuilder),
        Err(e) => return Err(SiteError::InvalidInput(e)),
    };

    let finder = SiteFinder::new(
        PgCompetitorRepository::new(pool.get_ref().clone()),
        area_backend,
        roads.get_ref().clone(),
        MapReporter::new(
            PgDebugMapRepository::new(pool.get_ref().clone()),
            config.debug_maps_enabled,
        ),
        SearchSettings {
            radius_m: config.search_radius_m,
            grid_step_m: config.grid_step_m,
        },
    );

    log::info!(
        "Recommendation requested for '{}' at ({}, {})",
        req.category,
        user.latitude,
        user.longitude
    );

    let outcome = finder
        .find_optimal_location(user, &req.category, req.grid_step_m)
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// Configuration for recommendation routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/recommendations", web::post().to(recommend));
}
