// src/services/grid_optimizer.rs
// DOCUMENTATION: Discretized maximin search over the search area
// PURPOSE: Find the lattice point farthest from its nearest competitor

use crate::models::{BoundingBox, GeoPoint, SearchArea};
use crate::services::geo_math::{distance, meters_to_degree_step, normalize_longitude};
use serde::Serialize;

/// Lattice point paired with its clearance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub point: GeoPoint,
    /// Meters to the nearest competitor
    pub clearance_m: f64,
}

/// Regular lattice over a bounding box
/// DOCUMENTATION: Row-major scan, latitude rows from south to north and
/// longitude columns from west to east. Coordinates are accumulated by
/// repeated addition of the degree step, so a row or column that lands on
/// the boundary within floating point error may or may not be emitted.
///
/// The iterator is lazy and Clone, so a grid can be scanned more than once.
#[derive(Debug, Clone)]
pub struct CandidateGrid {
    bbox: BoundingBox,
    deg_step: f64,
    lat: f64,
    lon: f64,
}

impl CandidateGrid {
    /// Lattice with spacing `step_m` meters (converted with the fixed
    /// meters-per-degree approximation)
    pub fn new(bbox: BoundingBox, step_m: f64) -> Self {
        Self::with_degree_step(bbox, meters_to_degree_step(step_m))
    }

    /// Lattice with spacing given directly in degrees
    /// A non-positive or non-finite step yields an empty grid
    pub fn with_degree_step(bbox: BoundingBox, deg_step: f64) -> Self {
        let lat = if deg_step.is_finite() && deg_step > 0.0 {
            bbox.min_lat
        } else {
            f64::INFINITY
        };

        CandidateGrid {
            bbox,
            deg_step,
            lat,
            lon: bbox.min_lon,
        }
    }

    pub fn deg_step(&self) -> f64 {
        self.deg_step
    }
}

impl Iterator for CandidateGrid {
    type Item = GeoPoint;

    fn next(&mut self) -> Option<GeoPoint> {
        while self.lat <= self.bbox.max_lat {
            if self.lon <= self.bbox.max_lon {
                let point = GeoPoint {
                    latitude: self.lat,
                    longitude: self.lon,
                };
                self.lon += self.deg_step;
                return Some(point);
            }

            // Next row
            self.lat += self.deg_step;
            self.lon = self.bbox.min_lon;
        }
        None
    }
}

/// Distance from `point` to the nearest competitor
/// Infinite for an empty competitor set
pub fn clearance(point: &GeoPoint, competitors: &[GeoPoint]) -> f64 {
    competitors
        .iter()
        .map(|c| distance(point, c))
        .fold(f64::INFINITY, f64::min)
}

/// Lattice points of `area` that lie strictly inside its polygon, with their
/// clearance, in scan order; longitudes are normalized into [-180, 180]
pub fn scored_candidates<'a>(
    area: &'a SearchArea,
    competitors: &'a [GeoPoint],
    step_m: f64,
) -> impl Iterator<Item = ScoredCandidate> + 'a {
    CandidateGrid::new(area.bbox, step_m)
        .filter(move |p| area.contains(p))
        .map(move |p| {
            // The area may extend past +-180 around an antimeridian center
            let point = GeoPoint {
                latitude: p.latitude,
                longitude: normalize_longitude(p.longitude),
            };
            ScoredCandidate {
                point,
                clearance_m: clearance(&point, competitors),
            }
        })
}

/// Keep the running best; a later candidate replaces it only when strictly
/// better, so ties resolve to the first point in scan order
pub fn select_best<I>(candidates: I) -> Option<ScoredCandidate>
where
    I: IntoIterator<Item = ScoredCandidate>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(b) if candidate.clearance_m <= b.clearance_m => Some(b),
        _ => Some(candidate),
    })
}

/// Grid search for the point maximizing the minimum distance to competitors
/// DOCUMENTATION: O(rows x cols x competitors), no pruning or spatial index.
/// Returns None when no lattice point falls inside the area. Callers must
/// pass a non-empty competitor set.
pub fn optimize(
    area: &SearchArea,
    competitors: &[GeoPoint],
    step_m: f64,
) -> Option<ScoredCandidate> {
    let best = select_best(scored_candidates(area, competitors, step_m));

    match &best {
        Some(candidate) => log::debug!(
            "Grid optimum at ({:.6}, {:.6}) with clearance {:.1}m (step {}m)",
            candidate.point.latitude,
            candidate.point.longitude,
            candidate.clearance_m,
            step_m
        ),
        None => log::debug!("No lattice point inside search area (step {}m)", step_m),
    }

    best
}
