// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, road client and start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use services::{start_cleanup_task, OverpassClient, RoadCache};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            format!("{},actix_web=info,sqlx=warn", config.log_level)
        } else {
            "info,actix_web=info,sqlx=warn".to_string()
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting site-finder service...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );
    log::info!(
        "Search radius {}m, grid step {}m, area backend {}",
        config.search_radius_m,
        config.grid_step_m,
        config.area_backend
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Initialize road data client with its cache
    let road_cache = Arc::new(RoadCache::new(config.road_cache_ttl_secs));
    start_cleanup_task(road_cache.clone(), 300);
    log::info!(
        "Initialized road cache (TTL: {}s, cleanup every 5 minutes)",
        config.road_cache_ttl_secs
    );

    let roads = match OverpassClient::new(
        config.overpass_url.clone(),
        config.overpass_timeout_secs,
        config.overpass_requests_per_second,
        road_cache,
    ) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to initialize Overpass client: {}", e);
            std::process::exit(1);
        }
    };

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_clone = config.clone();

    HttpServer::new(move || {
        App::new()
            // Application state (database pool, config, road client)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_clone.clone()))
            .app_data(web::Data::new(roads.clone()))
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::recommendations_config)
            .configure(handlers::categories_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
