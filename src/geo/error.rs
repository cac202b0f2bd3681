use thiserror::Error;

/// Failures while turning a location code into a routed destination.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeoError {
    #[error("Invalid location code: {0}")]
    InvalidLocationCode(String),

    #[error("Route unavailable: {0}")]
    RouteUnavailable(String),
}
