// src/models/category.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Place type a competitor set is keyed by
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    /// Stable code, e.g. "cafe" or "pharmacy"
    pub code: String,
    pub name: String,
}
