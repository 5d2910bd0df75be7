// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod category;
pub mod geo_point;
pub mod recommendation;

pub use category::*;
pub use geo_point::*;
pub use recommendation::*;
