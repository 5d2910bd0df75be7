// src/models/recommendation.rs
// DOCUMENTATION: Request and result models for site recommendations
// PURPOSE: API input validation and the explicit found / no-result outcome

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::GeoPoint;

/// Request DTO for POST /recommendations
/// DOCUMENTATION: Carries all per-request state; nothing about the caller's
/// choice of category is kept between requests
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendationRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    /// Place type code, e.g. "cafe"
    #[validate(length(min = 1, max = 64))]
    pub category: String,

    /// Lattice spacing override in meters
    #[validate(range(min = 1.0, max = 1000.0))]
    pub grid_step_m: Option<f64>,
}

/// Final recommendation for one request
/// DOCUMENTATION: Built once per request; `location` is snapped onto a road
/// when one was found, otherwise it is the raw optimizer point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub label: String,
    pub location: GeoPoint,
    pub user_location: GeoPoint,
    /// Great-circle distance from the unsnapped optimum to the nearest competitor
    pub clearance_m: f64,
    pub snapped: bool,
    pub competitor_count: usize,
    pub maps_url: String,
}

impl Recommendation {
    pub fn new(
        category: &str,
        location: GeoPoint,
        user_location: GeoPoint,
        clearance_m: f64,
        snapped: bool,
        competitor_count: usize,
    ) -> Self {
        Recommendation {
            label: format!("Recommended location for '{}'", category),
            maps_url: format!(
                "https://www.google.com/maps?q={},{}",
                location.latitude, location.longitude
            ),
            location,
            user_location,
            clearance_m,
            snapped,
            competitor_count,
        }
    }
}

/// Why no recommendation could be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoResultReason {
    /// The category has no known locations
    NoCompetitors,
    /// No lattice point fell inside the search area
    NoSearchSpace,
}

/// Result of a recommendation request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Found {
        recommendation: Recommendation,
        /// Stored diagnostic map, when reporting succeeded
        debug_map_id: Option<Uuid>,
    },
    NoResult {
        reason: NoResultReason,
    },
}

/// Stored diagnostic map
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DebugMap {
    pub id: Uuid,
    pub user_lat: f64,
    pub user_lon: f64,
    pub map_html: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let valid = RecommendationRequest {
            latitude: 55.7558,
            longitude: 37.6173,
            category: "cafe".to_string(),
            grid_step_m: None,
        };
        assert!(valid.validate().is_ok());

        let bad_lat = RecommendationRequest {
            latitude: 95.0,
            ..valid.clone()
        };
        assert!(bad_lat.validate().is_err());

        let empty_category = RecommendationRequest {
            category: String::new(),
            ..valid.clone()
        };
        assert!(empty_category.validate().is_err());

        let tiny_step = RecommendationRequest {
            grid_step_m: Some(0.5),
            ..valid
        };
        assert!(tiny_step.validate().is_err());
    }

    #[test]
    fn test_recommendation_label_and_link() {
        let user = GeoPoint::new(55.75, 37.61).unwrap();
        let spot = GeoPoint::new(55.76, 37.62).unwrap();
        let rec = Recommendation::new("cafe", spot, user, 812.5, true, 3);

        assert_eq!(rec.label, "Recommended location for 'cafe'");
        assert_eq!(rec.maps_url, "https://www.google.com/maps?q=55.76,37.62");
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = Outcome::NoResult {
            reason: NoResultReason::NoCompetitors,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "no_result");
        assert_eq!(json["reason"], "no_competitors");
    }
}
