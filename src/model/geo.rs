use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// A coordinate with an optional human-readable label.
///
/// Serializes flat as `{lat, lng, label?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Location {
    pub fn new(coordinate: Coordinate, label: impl Into<String>) -> Self {
        Self {
            coordinate,
            label: Some(label.into()),
        }
    }

    pub fn unlabeled(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            label: None,
        }
    }
}

impl From<Coordinate> for Location {
    fn from(coordinate: Coordinate) -> Self {
        Self::unlabeled(coordinate)
    }
}
