// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Simple endpoint to verify service status

use crate::services::OverpassClient;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn health_check(roads: web::Data<OverpassClient>) -> impl Responder {
    let road_cache = roads.cache().stats().await;

    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "site-finder",
        "version": env!("CARGO_PKG_VERSION"),
        "road_cache": road_cache
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
