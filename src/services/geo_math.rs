// src/services/geo_math.rs
// DOCUMENTATION: Spherical distance and degree/meter conversions
// PURPOSE: Pure functions used by the area builder and the grid optimizer

use crate::models::GeoPoint;
use geo_types::Coord;

/// Earth radius used for all great-circle distances, in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per degree of latitude used for lattice spacing
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Great-circle distance in meters (haversine formula)
/// Zero for coincident points, symmetric in its arguments
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let sin_dphi_half = (d_phi * 0.5).sin();
    let sin_dlambda_half = (d_lambda * 0.5).sin();

    let h = sin_dphi_half * sin_dphi_half
        + phi1.cos() * phi2.cos() * sin_dlambda_half * sin_dlambda_half;

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Convert a lattice step in meters into degrees
/// DOCUMENTATION: Fixed latitude-degree approximation, applied to both axes.
/// East-west spacing in meters therefore shrinks with cos(latitude); the
/// grid does not correct for it.
pub fn meters_to_degree_step(step_m: f64) -> f64 {
    step_m / METERS_PER_DEGREE
}

/// Bring a longitude back into [-180, 180]; values already in range are
/// returned unchanged
pub fn normalize_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 540.0).rem_euclid(360.0) - 180.0
    }
}

/// Shift `longitude` by whole turns to within 180 degrees of `reference`
pub fn unwrap_longitude(longitude: f64, reference: f64) -> f64 {
    longitude - 360.0 * ((longitude - reference) / 360.0).round()
}

/// Destination on the sphere as a (lon, lat) coordinate whose longitude is
/// continuous with the origin's: it may leave [-180, 180] by up to the
/// travelled angle, so rings built around an antimeridian center stay planar
///
/// Kept on EARTH_RADIUS_M rather than geo's HaversineDestination (mean radius
/// 6371008.8 m) so buffer vertices sit exactly at `distance` from the origin.
pub fn destination_coord(origin: &GeoPoint, bearing_deg: f64, distance_m: f64) -> Coord<f64> {
    let delta = distance_m / EARTH_RADIUS_M;
    let theta = bearing_deg.to_radians();
    let phi1 = origin.latitude.to_radians();

    let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos();
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
    let d_lambda =
        (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

    Coord {
        x: origin.longitude + d_lambda.to_degrees(),
        y: phi2.to_degrees(),
    }
}

/// Point reached by travelling `distance_m` from `origin` along the initial
/// bearing `bearing_deg` (clockwise from north) on the sphere
pub fn destination(origin: &GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    let c = destination_coord(origin, bearing_deg, distance_m);
    GeoPoint {
        latitude: c.y,
        longitude: normalize_longitude(c.x),
    }
}
