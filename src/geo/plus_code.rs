//! Open Location Code ("plus code") resolution.
//!
//! A full code such as `8J3Q7JPX+JJ8` names a small cell on the globe. A short
//! code such as `7JPX+JJ8` drops the leading digits and is recovered against a
//! nearby reference point before decoding. The code arithmetic itself comes
//! from the `open-location-code` crate.

use super::{GeoError, LocationResolver};
use crate::model::{Coordinate, Location};
use ::geo::Point;

fn to_point(coordinate: Coordinate) -> Point<f64> {
    Point::new(coordinate.lng, coordinate.lat)
}

fn from_point(point: Point<f64>) -> Coordinate {
    Coordinate::new(point.y(), point.x())
}

/// Resolves plus codes offline against a reference point.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlusCodeResolver;

impl PlusCodeResolver {
    pub fn new() -> Self {
        Self
    }

    /// Expands `code` to a full code, recovering short codes near `reference`.
    pub fn full_code(&self, code: &str, reference: Coordinate) -> Result<String, GeoError> {
        let invalid = || GeoError::InvalidLocationCode(code.to_string());
        // the decoder slices by byte offset
        if !code.is_ascii() || !open_location_code::is_valid(code) {
            return Err(invalid());
        }
        open_location_code::recover_nearest(code, to_point(reference)).map_err(|_| invalid())
    }
}

impl LocationResolver for PlusCodeResolver {
    fn resolve(&self, code: &str, reference: Coordinate) -> Result<Location, GeoError> {
        let trimmed = code.trim();
        let full = self.full_code(trimmed, reference)?;
        let area = open_location_code::decode(&full)
            .map_err(|_| GeoError::InvalidLocationCode(trimmed.to_string()))?;
        let center = from_point(area.center);
        tracing::debug!(code = trimmed, full = %full, %center, "Resolved location code");
        Ok(Location::new(center, format!("Plus Code: {trimmed}")))
    }
}
