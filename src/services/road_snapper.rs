// src/services/road_snapper.rs
// DOCUMENTATION: Post-hoc snap of the optimum onto the road network
// PURPOSE: Move the recommended point onto the nearest road, best effort

use crate::errors::SiteError;
use crate::models::{BoundingBox, GeoPoint};
use geo::{EuclideanDistance, LineInterpolatePoint, LineLocatePoint};
use crate::services::geo_math::{normalize_longitude, unwrap_longitude};
use geo_types::{Coord, LineString, Point};

/// Source of road polylines, (lon, lat) coordinates
#[allow(async_fn_in_trait)]
pub trait RoadSource {
    async fn fetch_roads(&self, bbox: &BoundingBox) -> Result<Vec<LineString<f64>>, SiteError>;
}

/// Nearest point of `road` to `point`
/// DOCUMENTATION: Arc-length parameterization in degree space: locate the
/// fraction along the line closest to the point, then interpolate at it
pub fn project_onto(road: &LineString<f64>, point: &Point<f64>) -> Option<Point<f64>> {
    let fraction = road.line_locate_point(point)?;
    road.line_interpolate_point(fraction)
}

/// Closest projection of `point` across all roads
/// DOCUMENTATION: Road longitudes are unwrapped around the point first, so a
/// road just across the antimeridian is compared in continuous coordinates.
/// Returns None when no road yields a projection
pub fn nearest_projection(point: &GeoPoint, roads: &[LineString<f64>]) -> Option<GeoPoint> {
    let origin = Point::from(*point);

    roads
        .iter()
        .map(|road| unwrap_road(road, point.longitude))
        .filter_map(|road| project_onto(&road, &origin))
        .map(|p| (origin.euclidean_distance(&p), p))
        .filter(|(d, _)| d.is_finite())
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, p)| GeoPoint {
            latitude: p.y(),
            longitude: normalize_longitude(p.x()),
        })
}

fn unwrap_road(road: &LineString<f64>, reference_lon: f64) -> LineString<f64> {
    road.coords()
        .map(|c| Coord {
            x: unwrap_longitude(c.x, reference_lon),
            y: c.y,
        })
        .collect()
}

/// Snaps points using roads from a RoadSource
pub struct RoadSnapper<R> {
    roads: R,
}

impl<R: RoadSource> RoadSnapper<R> {
    pub fn new(roads: R) -> Self {
        Self { roads }
    }

    /// Snapped location, or None when snapping is unavailable
    /// DOCUMENTATION: Fetch failures are logged and swallowed; an empty road
    /// network is not an error. Callers fall back to the unsnapped point.
    pub async fn snap(&self, point: &GeoPoint, bbox: &BoundingBox) -> Option<GeoPoint> {
        let roads = match self.roads.fetch_roads(bbox).await {
            Ok(roads) => roads,
            Err(e) => {
                log::error!("Road snapping failed: {}", e);
                return None;
            }
        };

        if roads.is_empty() {
            log::info!("No roads inside {}, keeping unsnapped point", bbox.to_overpass());
            return None;
        }

        let snapped = nearest_projection(point, &roads);
        match &snapped {
            Some(p) => log::debug!(
                "Snapped ({:.6}, {:.6}) -> ({:.6}, {:.6}) using {} roads",
                point.latitude,
                point.longitude,
                p.latitude,
                p.longitude,
                roads.len()
            ),
            None => log::warn!("No road produced a projection for {} roads", roads.len()),
        }
        snapped
    }
}
