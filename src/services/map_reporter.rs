// src/services/map_reporter.rs
// DOCUMENTATION: Diagnostic map side channel
// PURPOSE: Render user, competitors and recommendation onto an HTML map and
// hand it to an artifact sink. Never affects the recommendation itself.

use crate::errors::SiteError;
use crate::models::GeoPoint;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde_json::json;
use uuid::Uuid;

/// Storage for rendered maps
#[allow(async_fn_in_trait)]
pub trait ArtifactSink {
    async fn store(&self, user: &GeoPoint, map_html: &str) -> Result<Uuid, SiteError>;
}

/// Best-effort map reporter
pub struct MapReporter<S> {
    sink: S,
    enabled: bool,
}

fn point_feature(point: &GeoPoint, role: &str) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("role".to_string(), json!(role));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            point.longitude,
            point.latitude,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// GeoJSON overlay with one feature per marker, tagged by `role`
pub fn build_overlay(
    user: &GeoPoint,
    recommended: &GeoPoint,
    competitors: &[GeoPoint],
) -> FeatureCollection {
    let mut features = Vec::with_capacity(competitors.len() + 2);
    features.push(point_feature(user, "user"));
    features.extend(competitors.iter().map(|c| point_feature(c, "competitor")));
    features.push(point_feature(recommended, "recommended"));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Self-contained Leaflet page centered on the user at zoom 15
pub fn render_map(user: &GeoPoint, recommended: &GeoPoint, competitors: &[GeoPoint]) -> String {
    let overlay = GeoJson::FeatureCollection(build_overlay(user, recommended, competitors)).to_string();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<title>Site recommendation</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map('map').setView([{lat}, {lon}], 15);
L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
  attribution: '&copy; OpenStreetMap contributors'
}}).addTo(map);
var overlay = {overlay};
L.geoJSON(overlay, {{
  pointToLayer: function (feature, latlng) {{
    switch (feature.properties.role) {{
      case 'competitor':
        return L.circleMarker(latlng, {{radius: 5, color: 'red', fill: true}});
      case 'recommended':
        return L.marker(latlng).bindTooltip('Recommended');
      default:
        return L.marker(latlng).bindTooltip('User');
    }}
  }}
}}).addTo(map);
</script>
</body>
</html>
"#,
        lat = user.latitude,
        lon = user.longitude,
        overlay = overlay,
    )
}

impl<S: ArtifactSink> MapReporter<S> {
    pub fn new(sink: S, enabled: bool) -> Self {
        Self { sink, enabled }
    }

    /// Render and store the map
    /// DOCUMENTATION: Returns the stored map id, or None when reporting is
    /// disabled or the sink failed (the failure is logged)
    pub async fn report(
        &self,
        user: &GeoPoint,
        recommended: &GeoPoint,
        competitors: &[GeoPoint],
    ) -> Option<Uuid> {
        if !self.enabled {
            return None;
        }

        let html = render_map(user, recommended, competitors);
        match self.sink.store(user, &html).await {
            Ok(id) => {
                log::info!("Saved debug map {}", id);
                Some(id)
            }
            Err(e) => {
                log::error!("Failed to save debug map: {}", e);
                None
            }
        }
    }
}
