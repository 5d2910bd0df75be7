// src/services/site_finder.rs
// DOCUMENTATION: Site recommendation pipeline
// PURPOSE: competitors -> search area -> grid optimum -> road snap -> report

use crate::db::CompetitorSource;
use crate::errors::SiteError;
use crate::models::{GeoPoint, NoResultReason, Outcome, Recommendation};
use crate::services::{optimize, AreaBuilder, ArtifactSink, MapReporter, RoadSnapper, RoadSource};

/// Search parameters shared by every request
#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    /// Radius of the search disk around the user, meters
    pub radius_m: f64,
    /// Default lattice spacing, meters
    pub grid_step_m: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            radius_m: 1000.0,
            grid_step_m: 50.0,
        }
    }
}

/// Recommends a spot maximally distant from competitors near the user
/// DOCUMENTATION: Holds no per-request state; every input of a request is an
/// argument of find_optimal_location()
pub struct SiteFinder<C, A, R, S> {
    competitors: C,
    area_builder: A,
    snapper: RoadSnapper<R>,
    reporter: MapReporter<S>,
    settings: SearchSettings,
}

impl<C, A, R, S> SiteFinder<C, A, R, S>
where
    C: CompetitorSource,
    A: AreaBuilder,
    R: RoadSource,
    S: ArtifactSink,
{
    pub fn new(
        competitors: C,
        area_builder: A,
        roads: R,
        reporter: MapReporter<S>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            competitors,
            area_builder,
            snapper: RoadSnapper::new(roads),
            reporter,
            settings,
        }
    }

    /// Run the full pipeline for one request
    /// DOCUMENTATION:
    /// - Point store and buffer failures propagate as errors
    /// - An empty competitor set or an empty lattice yields Outcome::NoResult
    /// - Road snapping and map reporting never fail the request
    ///
    /// # Arguments
    /// * `user` - Requesting user's location
    /// * `category` - Place type code
    /// * `grid_step_m` - Lattice spacing override; defaults to the configured step
    pub async fn find_optimal_location(
        &self,
        user: GeoPoint,
        category: &str,
        grid_step_m: Option<f64>,
    ) -> Result<Outcome, SiteError> {
        let step_m = grid_step_m.unwrap_or(self.settings.grid_step_m);

        let competitors = self.competitors.fetch(category).await?;
        if competitors.is_empty() {
            log::warn!("No competitors found for type '{}'", category);
            return Ok(Outcome::NoResult {
                reason: NoResultReason::NoCompetitors,
            });
        }

        let area = self
            .area_builder
            .build(&user, self.settings.radius_m)
            .await?;

        let best = match optimize(&area, &competitors, step_m) {
            Some(best) => best,
            None => {
                log::warn!("No valid point found in buffer (step {}m)", step_m);
                return Ok(Outcome::NoResult {
                    reason: NoResultReason::NoSearchSpace,
                });
            }
        };

        let snapped = self.snapper.snap(&best.point, &area.bbox).await;
        let location = snapped.unwrap_or(best.point);

        let debug_map_id = self.reporter.report(&user, &location, &competitors).await;

        log::info!(
            "Optimal location for '{}' at ({}, {}) with clearance {:.1}m{}",
            category,
            location.latitude,
            location.longitude,
            best.clearance_m,
            if snapped.is_some() { " (snapped to road)" } else { "" }
        );

        Ok(Outcome::Found {
            recommendation: Recommendation::new(
                category,
                location,
                user,
                best.clearance_m,
                snapped.is_some(),
                competitors.len(),
            ),
            debug_map_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoundingBox, SearchArea};
    use crate::services::geo_math::distance;
    use crate::services::GeodesicAreaBuilder;
    use geo_types::LineString;
    use std::cell::Cell;
    use uuid::Uuid;

    struct StaticCompetitors(Vec<GeoPoint>);

    impl CompetitorSource for StaticCompetitors {
        async fn fetch(&self, _: &str) -> Result<Vec<GeoPoint>, SiteError> {
            Ok(self.0.clone())
        }
    }

    struct OfflineStore;

    impl CompetitorSource for OfflineStore {
        async fn fetch(&self, _: &str) -> Result<Vec<GeoPoint>, SiteError> {
            Err(SiteError::DatabaseError("connection refused".into()))
        }
    }

    #[derive(Default)]
    struct CountingAreaBuilder {
        calls: Cell<usize>,
    }

    impl AreaBuilder for CountingAreaBuilder {
        async fn build(&self, center: &GeoPoint, radius_m: f64) -> Result<SearchArea, SiteError> {
            self.calls.set(self.calls.get() + 1);
            GeodesicAreaBuilder::buffer(center, radius_m)
        }
    }

    struct StaticRoads(Vec<LineString<f64>>);

    impl RoadSource for StaticRoads {
        async fn fetch_roads(&self, _: &BoundingBox) -> Result<Vec<LineString<f64>>, SiteError> {
            Ok(self.0.clone())
        }
    }

    struct UnreachableRoads;

    impl RoadSource for UnreachableRoads {
        async fn fetch_roads(&self, _: &BoundingBox) -> Result<Vec<LineString<f64>>, SiteError> {
            Err(SiteError::ExternalApiError("Request failed: connection refused".into()))
        }
    }

    struct AcceptingSink;

    impl ArtifactSink for AcceptingSink {
        async fn store(&self, _: &GeoPoint, _: &str) -> Result<Uuid, SiteError> {
            Ok(Uuid::new_v4())
        }
    }

    struct BrokenSink;

    impl ArtifactSink for BrokenSink {
        async fn store(&self, _: &GeoPoint, _: &str) -> Result<Uuid, SiteError> {
            Err(SiteError::DatabaseError("disk full".into()))
        }
    }

    fn user() -> GeoPoint {
        GeoPoint::new(55.7558, 37.6173).unwrap()
    }

    fn nearby_cafe() -> Vec<GeoPoint> {
        vec![GeoPoint::new(55.7560, 37.6175).unwrap()]
    }

    fn expect_found(outcome: Outcome) -> (Recommendation, Option<Uuid>) {
        match outcome {
            Outcome::Found {
                recommendation,
                debug_map_id,
            } => (recommendation, debug_map_id),
            other => panic!("expected a recommendation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_category_skips_search() {
        let finder = SiteFinder::new(
            StaticCompetitors(Vec::new()),
            CountingAreaBuilder::default(),
            StaticRoads(Vec::new()),
            MapReporter::new(AcceptingSink, true),
            SearchSettings::default(),
        );

        let outcome = finder.find_optimal_location(user(), "cafe", None).await.unwrap();

        assert!(matches!(
            outcome,
            Outcome::NoResult {
                reason: NoResultReason::NoCompetitors
            }
        ));
        assert_eq!(finder.area_builder.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let finder = SiteFinder::new(
            OfflineStore,
            CountingAreaBuilder::default(),
            StaticRoads(Vec::new()),
            MapReporter::new(AcceptingSink, true),
            SearchSettings::default(),
        );

        let result = finder.find_optimal_location(user(), "cafe", None).await;
        assert!(matches!(result, Err(SiteError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_oversized_step_has_no_search_space() {
        let finder = SiteFinder::new(
            StaticCompetitors(nearby_cafe()),
            CountingAreaBuilder::default(),
            StaticRoads(Vec::new()),
            MapReporter::new(AcceptingSink, true),
            SearchSettings::default(),
        );

        let outcome = finder
            .find_optimal_location(user(), "cafe", Some(50_000.0))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            Outcome::NoResult {
                reason: NoResultReason::NoSearchSpace
            }
        ));
    }

    #[tokio::test]
    async fn test_recommendation_without_roads() {
        let finder = SiteFinder::new(
            StaticCompetitors(nearby_cafe()),
            CountingAreaBuilder::default(),
            StaticRoads(Vec::new()),
            MapReporter::new(AcceptingSink, true),
            SearchSettings::default(),
        );

        let outcome = finder.find_optimal_location(user(), "cafe", None).await.unwrap();
        let (rec, debug_map_id) = expect_found(outcome);

        assert!(!rec.snapped);
        assert!(debug_map_id.is_some());
        assert_eq!(rec.user_location, user());
        assert_eq!(rec.competitor_count, 1);
        assert_eq!(rec.label, "Recommended location for 'cafe'");
        assert!(rec.clearance_m >= 50.0);
        assert!(distance(&user(), &rec.location) <= 1000.0);
    }

    #[tokio::test]
    async fn test_road_failure_falls_back_to_grid_point() {
        let unsnapped = SiteFinder::new(
            StaticCompetitors(nearby_cafe()),
            CountingAreaBuilder::default(),
            StaticRoads(Vec::new()),
            MapReporter::new(AcceptingSink, false),
            SearchSettings::default(),
        );
        let failing = SiteFinder::new(
            StaticCompetitors(nearby_cafe()),
            CountingAreaBuilder::default(),
            UnreachableRoads,
            MapReporter::new(AcceptingSink, false),
            SearchSettings::default(),
        );

        let (expected, _) =
            expect_found(unsnapped.find_optimal_location(user(), "cafe", None).await.unwrap());
        let (rec, _) =
            expect_found(failing.find_optimal_location(user(), "cafe", None).await.unwrap());

        assert!(!rec.snapped);
        assert_eq!(rec.location, expected.location);
        assert_eq!(rec.clearance_m, expected.clearance_m);
    }

    #[tokio::test]
    async fn test_snaps_onto_road() {
        // East-west road through the user's latitude
        let road = LineString::from(vec![(37.55, 55.7558), (37.70, 55.7558)]);
        let finder = SiteFinder::new(
            StaticCompetitors(nearby_cafe()),
            CountingAreaBuilder::default(),
            StaticRoads(vec![road]),
            MapReporter::new(AcceptingSink, false),
            SearchSettings::default(),
        );

        let outcome = finder.find_optimal_location(user(), "cafe", None).await.unwrap();
        let (rec, debug_map_id) = expect_found(outcome);

        assert!(rec.snapped);
        assert!((rec.location.latitude - 55.7558).abs() < 1e-9);
        assert!(debug_map_id.is_none());
    }

    #[tokio::test]
    async fn test_reporting_failure_keeps_recommendation() {
        let reporting = SiteFinder::new(
            StaticCompetitors(nearby_cafe()),
            CountingAreaBuilder::default(),
            StaticRoads(Vec::new()),
            MapReporter::new(BrokenSink, true),
            SearchSettings::default(),
        );

        let (rec, debug_map_id) =
            expect_found(reporting.find_optimal_location(user(), "cafe", None).await.unwrap());

        assert!(debug_map_id.is_none());
        assert!(rec.clearance_m > 900.0);
    }

    #[tokio::test]
    async fn test_grid_step_override() {
        let finder = SiteFinder::new(
            StaticCompetitors(nearby_cafe()),
            CountingAreaBuilder::default(),
            StaticRoads(Vec::new()),
            MapReporter::new(AcceptingSink, false),
            SearchSettings {
                radius_m: 1000.0,
                grid_step_m: 200.0,
            },
        );

        let (coarse, _) =
            expect_found(finder.find_optimal_location(user(), "cafe", None).await.unwrap());
        let (fine, _) = expect_found(
            finder
                .find_optimal_location(user(), "cafe", Some(25.0))
                .await
                .unwrap(),
        );

        assert!(fine.clearance_m >= coarse.clearance_m - 0.01);
    }

    #[tokio::test]
    async fn test_user_on_antimeridian_gets_nearby_location() {
        let user = GeoPoint::new(0.0, 179.999).unwrap();
        let finder = SiteFinder::new(
            StaticCompetitors(vec![GeoPoint::new(0.0, 179.998).unwrap()]),
            CountingAreaBuilder::default(),
            StaticRoads(Vec::new()),
            MapReporter::new(AcceptingSink, false),
            SearchSettings::default(),
        );

        let outcome = finder.find_optimal_location(user, "cafe", None).await.unwrap();
        let (recommendation, _) = expect_found(outcome);

        let location = recommendation.location;
        assert!(GeoPoint::new(location.latitude, location.longitude).is_ok());
        assert!(distance(&user, &location) < 1000.0);
    }

    #[tokio::test]
    async fn test_disk_over_pole_is_a_geometry_error() {
        let finder = SiteFinder::new(
            StaticCompetitors(nearby_cafe()),
            CountingAreaBuilder::default(),
            StaticRoads(Vec::new()),
            MapReporter::new(AcceptingSink, false),
            SearchSettings::default(),
        );

        let user = GeoPoint::new(89.995, 10.0).unwrap();
        let result = finder.find_optimal_location(user, "cafe", None).await;
        assert!(matches!(result, Err(SiteError::GeometryError(_))));
    }
}
