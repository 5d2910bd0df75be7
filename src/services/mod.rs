// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod geo_math;
pub mod grid_optimizer;
pub mod map_reporter;
pub mod overpass_client;
pub mod road_cache;
pub mod road_snapper;
pub mod search_area;
pub mod site_finder;

pub use grid_optimizer::*;
pub use map_reporter::*;
pub use overpass_client::*;
pub use road_cache::*;
pub use road_snapper::*;
pub use search_area::*;
pub use site_finder::*;
