// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod category_repository;
pub mod competitor_repository;
pub mod debug_map_repository;

pub use category_repository::*;
pub use competitor_repository::*;
pub use debug_map_repository::*;
