// src/models/geo_point.rs
// DOCUMENTATION: Geographic primitives shared by every stage of the pipeline
// PURPOSE: WGS84 points, bounding boxes and the admissible search area

use crate::errors::SiteError;
use geo::{BoundingRect, Contains};
use geo_types::{Point, Polygon};
use serde::{Deserialize, Serialize};

/// WGS84 coordinate in degrees
/// DOCUMENTATION: Construct from untrusted input with GeoPoint::new(),
/// which enforces latitude in [-90, 90] and longitude in [-180, 180]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a validated point
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, SiteError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SiteError::InvalidInput(format!(
                "latitude out of range: {}",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SiteError::InvalidInput(format!(
                "longitude out of range: {}",
                longitude
            )));
        }
        Ok(GeoPoint {
            latitude,
            longitude,
        })
    }
}

/// geo-types points are (x, y) = (longitude, latitude)
impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.longitude, p.latitude)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(p: Point<f64>) -> Self {
        GeoPoint {
            latitude: p.y(),
            longitude: p.x(),
        }
    }
}

/// Axis-aligned bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Overpass QL bbox filter: (south,west,north,east)
    /// Longitudes of an area unwrapped past the antimeridian are clamped to
    /// +-180, so only the center's side of the antimeridian is queried
    pub fn to_overpass(&self) -> String {
        format!(
            "({},{},{},{})",
            self.min_lat,
            self.min_lon.max(-180.0),
            self.max_lat,
            self.max_lon.min(180.0)
        )
    }
}

/// Admissible search region around the user
/// DOCUMENTATION: Closed polygon in degree coordinates plus its bounding box,
/// which drives the candidate lattice
#[derive(Debug, Clone)]
pub struct SearchArea {
    pub polygon: Polygon<f64>,
    pub bbox: BoundingBox,
}

impl SearchArea {
    /// Wrap a polygon, computing its bounding box
    pub fn from_polygon(polygon: Polygon<f64>) -> Result<Self, SiteError> {
        let rect = polygon
            .bounding_rect()
            .ok_or_else(|| SiteError::GeometryError("search area polygon is empty".into()))?;

        let bbox = BoundingBox {
            min_lat: rect.min().y,
            min_lon: rect.min().x,
            max_lat: rect.max().y,
            max_lon: rect.max().x,
        };

        Ok(SearchArea { polygon, bbox })
    }

    /// Strict interior test; boundary points are outside
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.polygon.contains(&Point::from(*point))
    }
}
