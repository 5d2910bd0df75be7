// src/handlers/categories.rs
// DOCUMENTATION: Category listing and diagnostic map retrieval

use crate::db::{CategoryRepository, PgDebugMapRepository};
use crate::errors::SiteError;
use actix_web::{http::header::ContentType, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

/// GET /categories
/// Place types a recommendation can be requested for
pub async fn list_categories(pool: web::Data<PgPool>) -> Result<impl Responder, SiteError> {
    let categories = CategoryRepository::list(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(categories))
}

/// GET /debug-maps/{id}
/// Stored diagnostic map as an HTML page
pub async fn get_debug_map(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, SiteError> {
    let map = PgDebugMapRepository::get_by_id(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(map.map_html))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/categories", web::get().to(list_categories))
        .route("/debug-maps/{id}", web::get().to(get_debug_map));
}
