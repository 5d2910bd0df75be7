// src/services/search_area.rs
// DOCUMENTATION: Search area builders
// PURPOSE: Buffer the user location into a disk of true radius (meters),
// returned as a polygon in degree coordinates

use crate::errors::SiteError;
use crate::models::{GeoPoint, SearchArea};
use crate::services::geo_math;
use geo_types::{Coord, LineString, Polygon};
use sqlx::PgPool;

/// Vertex count of a buffered disk; PostGIS uses 8 segments per quadrant
pub const BUFFER_VERTICES: usize = 32;

/// Builds the admissible search region around a center point
/// DOCUMENTATION: Implementations must buffer in meters on the Earth's
/// surface, never with a fixed radius in degrees
#[allow(async_fn_in_trait)]
pub trait AreaBuilder {
    async fn build(&self, center: &GeoPoint, radius_m: f64) -> Result<SearchArea, SiteError>;
}

/// PostGIS geography buffer
/// DOCUMENTATION: ST_Buffer on the geography type buffers in meters; the
/// result comes back as GeoJSON and is parsed with the geojson crate
#[derive(Clone)]
pub struct PostgisAreaBuilder {
    pool: PgPool,
}

impl PostgisAreaBuilder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AreaBuilder for PostgisAreaBuilder {
    async fn build(&self, center: &GeoPoint, radius_m: f64) -> Result<SearchArea, SiteError> {
        ensure_pole_free(center, radius_m)?;

        let (geojson_text,): (String,) = sqlx::query_as(
            r#"
            SELECT ST_AsGeoJSON(
                ST_Buffer(
                    ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography,
                    $3
                )::geometry
            )
            "#,
        )
        .bind(center.longitude) // $1
        .bind(center.latitude) // $2
        .bind(radius_m) // $3
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to buffer search area: {}", e);
            SiteError::DatabaseError(e.to_string())
        })?;

        let polygon = polygon_from_geojson(&geojson_text)?;
        SearchArea::from_polygon(unwrap_longitudes(polygon, center.longitude))
    }
}

/// Reject disks that reach a pole
/// DOCUMENTATION: Such a disk has no bounded ring in lon/lat coordinates, so
/// planar containment and the lattice bbox would not describe it
pub fn ensure_pole_free(center: &GeoPoint, radius_m: f64) -> Result<(), SiteError> {
    let pole = GeoPoint {
        latitude: 90.0_f64.copysign(center.latitude),
        longitude: center.longitude,
    };
    let to_pole = geo_math::distance(center, &pole);
    if to_pole <= radius_m {
        return Err(SiteError::GeometryError(format!(
            "search disk of {}m around ({}, {}) reaches the pole ({:.0}m away)",
            radius_m, center.latitude, center.longitude, to_pole
        )));
    }
    Ok(())
}

/// Shift vertex longitudes by whole turns so each lies within 180 degrees of
/// `center_lon`; a ring that crosses the antimeridian becomes continuous
pub fn unwrap_longitudes(mut polygon: Polygon<f64>, center_lon: f64) -> Polygon<f64> {
    polygon.exterior_mut(|ring| unwrap_ring(ring, center_lon));
    polygon.interiors_mut(|rings| {
        for ring in rings {
            unwrap_ring(ring, center_lon);
        }
    });
    polygon
}

fn unwrap_ring(ring: &mut LineString<f64>, center_lon: f64) {
    for c in ring.0.iter_mut() {
        c.x = geo_math::unwrap_longitude(c.x, center_lon);
    }
}

/// Parse a GeoJSON Polygon geometry into a geo-types polygon
pub fn polygon_from_geojson(text: &str) -> Result<Polygon<f64>, SiteError> {
    let geometry: geojson::Geometry = serde_json::from_str(text)
        .map_err(|e| SiteError::GeometryError(format!("Invalid buffer GeoJSON: {}", e)))?;

    let rings = match geometry.value {
        geojson::Value::Polygon(rings) => rings,
        _ => {
            return Err(SiteError::GeometryError(
                "Expected a Polygon buffer geometry".into(),
            ))
        }
    };

    let mut rings = rings.into_iter().map(ring_from_positions);
    let exterior = rings
        .next()
        .ok_or_else(|| SiteError::GeometryError("Buffer polygon has no rings".into()))??;
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(exterior, interiors))
}

fn ring_from_positions(positions: Vec<Vec<f64>>) -> Result<LineString<f64>, SiteError> {
    positions
        .into_iter()
        .map(|pos| match pos.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(SiteError::GeometryError(
                "Buffer position has fewer than two coordinates".into(),
            )),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

/// In-process geodesic buffer
/// DOCUMENTATION: Places BUFFER_VERTICES points at equal bearings and the
/// requested great-circle distance from the center
#[derive(Debug, Clone, Copy, Default)]
pub struct GeodesicAreaBuilder;

impl GeodesicAreaBuilder {
    pub fn buffer(center: &GeoPoint, radius_m: f64) -> Result<SearchArea, SiteError> {
        if !(radius_m.is_finite() && radius_m > 0.0) {
            return Err(SiteError::InvalidInput(format!(
                "buffer radius must be positive, got {}",
                radius_m
            )));
        }

        ensure_pole_free(center, radius_m)?;

        // Longitudes stay continuous with the center, possibly beyond +-180
        let step = 360.0 / BUFFER_VERTICES as f64;
        let ring: Vec<Coord<f64>> = (0..BUFFER_VERTICES)
            .map(|i| geo_math::destination_coord(center, i as f64 * step, radius_m))
            .collect();

        // Polygon::new closes the ring
        SearchArea::from_polygon(Polygon::new(LineString::new(ring), vec![]))
    }
}

impl AreaBuilder for GeodesicAreaBuilder {
    async fn build(&self, center: &GeoPoint, radius_m: f64) -> Result<SearchArea, SiteError> {
        Self::buffer(center, radius_m)
    }
}

/// Backend selected by AREA_BACKEND
#[derive(Clone)]
pub enum AreaBackend {
    Postgis(PostgisAreaBuilder),
    Local(GeodesicAreaBuilder),
}

impl AreaBuilder for AreaBackend {
    async fn build(&self, center: &GeoPoint, radius_m: f64) -> Result<SearchArea, SiteError> {
        match self {
            AreaBackend::Postgis(builder) => builder.build(center, radius_m).await,
            AreaBackend::Local(builder) => builder.build(center, radius_m).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::geo_math::distance;

    #[test]
    fn test_geodesic_buffer_radius() {
        let center = GeoPoint::new(55.7558, 37.6173).unwrap();
        let area = GeodesicAreaBuilder::buffer(&center, 1000.0).unwrap();

        // 32 vertices plus the closing one
        assert_eq!(area.polygon.exterior().0.len(), BUFFER_VERTICES + 1);
        for c in area.polygon.exterior().coords() {
            let v = GeoPoint {
                latitude: c.y,
                longitude: c.x,
            };
            assert!((distance(&center, &v) - 1000.0).abs() < 0.01);
        }
        assert!(area.contains(&center));
    }

    #[test]
    fn test_geodesic_buffer_is_wider_in_degrees_at_high_latitude() {
        // A true-distance disk spans more longitude degrees than latitude
        // degrees away from the equator
        let center = GeoPoint::new(60.0, 30.0).unwrap();
        let area = GeodesicAreaBuilder::buffer(&center, 1000.0).unwrap();
        let lat_span = area.bbox.max_lat - area.bbox.min_lat;
        let lon_span = area.bbox.max_lon - area.bbox.min_lon;

        assert!((lon_span / lat_span - 2.0).abs() < 0.05);
    }

    #[test]
    fn test_geodesic_buffer_rejects_bad_radius() {
        let center = GeoPoint::new(0.0, 0.0).unwrap();
        assert!(GeodesicAreaBuilder::buffer(&center, 0.0).is_err());
        assert!(GeodesicAreaBuilder::buffer(&center, -5.0).is_err());
    }

    #[test]
    fn test_polygon_from_postgis_geojson() {
        let text = r#"{"type":"Polygon","coordinates":[[[37.0,55.0],[37.1,55.0],[37.1,55.1],[37.0,55.0]]]}"#;
        let polygon = polygon_from_geojson(text).unwrap();
        let area = SearchArea::from_polygon(polygon).unwrap();

        assert_eq!(area.bbox.min_lon, 37.0);
        assert_eq!(area.bbox.max_lat, 55.1);
    }

    #[test]
    fn test_polygon_from_geojson_rejects_other_types() {
        let text = r#"{"type":"Point","coordinates":[37.0,55.0]}"#;
        assert!(matches!(
            polygon_from_geojson(text),
            Err(SiteError::GeometryError(_))
        ));
        assert!(polygon_from_geojson("not json").is_err());
    }

    #[test]
    fn test_geodesic_buffer_across_antimeridian() {
        let center = GeoPoint::new(0.0, 179.999).unwrap();
        let area = GeodesicAreaBuilder::buffer(&center, 1000.0).unwrap();

        assert!(area.contains(&center));
        assert!(area.bbox.max_lon > 180.0);
        assert!(area.bbox.max_lon - area.bbox.min_lon < 0.02);
        for c in area.polygon.exterior().coords() {
            let v = GeoPoint {
                latitude: c.y,
                longitude: c.x,
            };
            assert!((distance(&center, &v) - 1000.0).abs() < 0.01);
        }
    }

    #[test]
    fn test_geodesic_buffer_rejects_disk_over_pole() {
        let north = GeoPoint::new(89.995, 10.0).unwrap();
        assert!(matches!(
            GeodesicAreaBuilder::buffer(&north, 1000.0),
            Err(SiteError::GeometryError(_))
        ));

        let south = GeoPoint::new(-89.995, -40.0).unwrap();
        assert!(GeodesicAreaBuilder::buffer(&south, 1000.0).is_err());

        // 1.1 km short of the pole is still a bounded disk
        let near = GeoPoint::new(89.99, 10.0).unwrap();
        assert!(GeodesicAreaBuilder::buffer(&near, 1000.0).is_ok());
    }

    #[test]
    fn test_postgis_ring_is_unwrapped_around_center() {
        // Buffer vertices returned in [-180, 180] on both sides of the antimeridian
        let text = r#"{"type":"Polygon","coordinates":[[[179.99,-0.01],[-179.99,-0.01],[-179.99,0.01],[179.99,0.01],[179.99,-0.01]]]}"#;
        let polygon = unwrap_longitudes(polygon_from_geojson(text).unwrap(), 179.999);
        let area = SearchArea::from_polygon(polygon).unwrap();

        assert!((area.bbox.min_lon - 179.99).abs() < 1e-9);
        assert!((area.bbox.max_lon - 180.01).abs() < 1e-9);
        assert!(area.contains(&GeoPoint { latitude: 0.0, longitude: 179.999 }));
    }

    #[tokio::test]
    async fn test_backend_dispatch() {
        let backend = AreaBackend::Local(GeodesicAreaBuilder);
        let center = GeoPoint::new(41.65, -0.88).unwrap();
        let area = backend.build(&center, 500.0).await.unwrap();
        assert!(area.contains(&center));
    }
}
