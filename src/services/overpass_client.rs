// src/services/overpass_client.rs
// DOCUMENTATION: Overpass API client for road geometry
// PURPOSE: Fetch highway ways inside a bounding box as polylines

use crate::errors::SiteError;
use crate::models::BoundingBox;
use crate::services::road_cache::RoadCache;
use crate::services::road_snapper::RoadSource;
use geo_types::LineString;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Overpass interpreter response (`[out:json]`)
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
    /// Present when the server aborted the query (timeout, memory)
    pub remark: Option<String>,
}

/// Element of an Overpass response; relations and areas are ignored
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverpassElement {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
    },
    #[serde(other)]
    Other,
}

/// Overpass API client
/// DOCUMENTATION: Cheap to clone; clones share the HTTP connection pool,
/// the road cache and the rate limiter
#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    base_url: String,
    timeout_secs: u64,
    cache: Arc<RoadCache>,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl OverpassClient {
    /// Create new Overpass client
    pub fn new(
        base_url: String,
        timeout_secs: u64,
        requests_per_second: u32,
        cache: Arc<RoadCache>,
    ) -> Result<Self, SiteError> {
        let client = Client::builder()
            // Leave the server its own query timeout plus transfer time
            .timeout(Duration::from_secs(timeout_secs + 5))
            .build()
            .map_err(|e| SiteError::ExternalApiError(format!("HTTP client setup failed: {}", e)))?;

        let per_second = NonZeroU32::new(requests_per_second).ok_or_else(|| {
            SiteError::InvalidInput("Overpass rate limit must be at least 1/s".to_string())
        })?;

        Ok(Self {
            client,
            base_url,
            timeout_secs,
            cache,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
        })
    }

    /// Shared road cache
    pub fn cache(&self) -> &Arc<RoadCache> {
        &self.cache
    }

    /// Overpass QL for all highway ways in the box, with their nodes
    pub fn build_query(&self, bbox: &BoundingBox) -> String {
        format!(
            "[out:json][timeout:{}];way['highway']{};(._;>;);out;",
            self.timeout_secs,
            bbox.to_overpass()
        )
    }

    /// Query the interpreter without consulting the cache
    pub async fn query_roads(&self, bbox: &BoundingBox) -> Result<Vec<LineString<f64>>, SiteError> {
        let query = self.build_query(bbox);

        self.limiter.until_ready().await;
        log::debug!("Overpass query: {}", query);

        let response = self
            .client
            .post(&self.base_url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| {
                log::error!("Overpass request failed: {}", e);
                SiteError::ExternalApiError(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Overpass API error {}: {}", status, body);
            return Err(SiteError::ExternalApiError(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let api_response: OverpassResponse = response.json().await.map_err(|e| {
            log::error!("Failed to parse Overpass response: {}", e);
            SiteError::ExternalApiError(format!("Parse error: {}", e))
        })?;

        let roads = complete_roads(api_response)?;
        log::info!("Overpass returned {} roads for {}", roads.len(), bbox.to_overpass());
        Ok(roads)
    }
}

impl RoadSource for OverpassClient {
    async fn fetch_roads(&self, bbox: &BoundingBox) -> Result<Vec<LineString<f64>>, SiteError> {
        let key = RoadCache::generate_key(bbox);
        if let Some(roads) = self.cache.get(&key).await {
            return Ok(roads.as_ref().clone());
        }

        let roads = self.query_roads(bbox).await?;
        self.cache.set(key, Arc::new(roads.clone())).await;
        Ok(roads)
    }
}

/// Roads of a response the server finished
/// DOCUMENTATION: A `remark` means the query was aborted (timeout, memory)
/// and the element list may be partial, so it is an error and never cached
pub fn complete_roads(response: OverpassResponse) -> Result<Vec<LineString<f64>>, SiteError> {
    if let Some(remark) = &response.remark {
        log::error!("Overpass query aborted: {}", remark);
        return Err(SiteError::ExternalApiError(format!(
            "Query aborted: {}",
            remark
        )));
    }
    Ok(roads_from_response(response))
}

/// Resolve way node references into (lon, lat) polylines
/// DOCUMENTATION: Nodes missing from the response are skipped; ways left with
/// fewer than two coordinates carry no line geometry and are dropped
pub fn roads_from_response(response: OverpassResponse) -> Vec<LineString<f64>> {
    let mut nodes: HashMap<i64, (f64, f64)> = HashMap::new();
    let mut ways: Vec<(i64, Vec<i64>)> = Vec::new();

    for element in response.elements {
        match element {
            OverpassElement::Node { id, lat, lon } => {
                nodes.insert(id, (lon, lat));
            }
            OverpassElement::Way { id, nodes: refs } => ways.push((id, refs)),
            OverpassElement::Other => {}
        }
    }

    ways.into_iter()
        .filter_map(|(id, refs)| {
            let coords: Vec<(f64, f64)> =
                refs.iter().filter_map(|r| nodes.get(r).copied()).collect();
            if coords.len() < 2 {
                log::debug!("Skipping way {} with {} resolvable nodes", id, coords.len());
                return None;
            }
            Some(LineString::from(coords))
        })
        .collect()
}
