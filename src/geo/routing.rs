//! Route planning against an OSRM-compatible HTTP engine.

use super::GeoError;
use crate::config::RoutingConfig;
use crate::model::Coordinate;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// A planned route, in traversal order from origin to destination.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub polyline: Vec<Coordinate>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl RoutePlan {
    /// Distance rendered for display, e.g. `"2.35 km"`.
    pub fn distance_text(&self) -> String {
        format!("{:.2} km", self.distance_meters / 1000.0)
    }
}

#[async_trait]
pub trait RoutePlanner: Send + Sync {
    async fn plan(&self, origin: Coordinate, destination: Coordinate) -> Result<RoutePlan, GeoError>;
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

/// GeoJSON line string; positions are `[lng, lat]`.
#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

fn plan_from_response(response: OsrmResponse) -> Result<RoutePlan, GeoError> {
    if response.code != "Ok" {
        let detail = response.message.unwrap_or_default();
        return Err(GeoError::RouteUnavailable(format!("{} {}", response.code, detail).trim().to_string()));
    }
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| GeoError::RouteUnavailable("no route between the points".into()))?;
    if route.geometry.coordinates.is_empty() {
        return Err(GeoError::RouteUnavailable("route has no geometry".into()));
    }
    Ok(RoutePlan {
        polyline: route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| Coordinate::new(lat, lng))
            .collect(),
        distance_meters: route.distance,
        duration_seconds: route.duration,
    })
}

/// HTTP client for the OSRM `route` service.
pub struct OsrmRoutePlanner {
    http: HttpClient,
    base_url: String,
    profile: String,
}

impl OsrmRoutePlanner {
    pub fn from_config(config: &RoutingConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            profile: config.profile.clone(),
        }
    }

    fn route_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, self.profile, origin.lng, origin.lat, destination.lng, destination.lat
        )
    }
}

#[async_trait]
impl RoutePlanner for OsrmRoutePlanner {
    #[instrument(skip(self, origin, destination), fields(origin = %origin, destination = %destination))]
    async fn plan(&self, origin: Coordinate, destination: Coordinate) -> Result<RoutePlan, GeoError> {
        let url = self.route_url(origin, destination);
        debug!(%url, "Requesting route");
        let unavailable = |err: reqwest::Error| GeoError::RouteUnavailable(err.to_string());

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;
        let body: OsrmResponse = response.json().await.map_err(unavailable)?;
        let plan = plan_from_response(body)?;
        debug!(
            waypoints = plan.polyline.len(),
            distance = %plan.distance_text(),
            "Route planned"
        );
        Ok(plan)
    }
}
