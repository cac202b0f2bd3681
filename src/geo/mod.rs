//! Turning a customer's location code into a routed, zone-checked destination.
//!
//! - [`LocationResolver`] / [`PlusCodeResolver`] - location code to coordinate
//! - [`RoutePlanner`] / [`OsrmRoutePlanner`] - road route between two points
//! - [`DeliveryZoneGuard`] - maximum route distance from the warehouse

pub mod error;
pub mod plus_code;
pub mod routing;
pub mod zone;

pub use error::GeoError;
pub use plus_code::PlusCodeResolver;
pub use routing::{OsrmRoutePlanner, RoutePlan, RoutePlanner};
pub use zone::{DeliveryZoneGuard, ZoneCheck};

use crate::model::{Coordinate, Location};

/// Decodes a location code, expanding short codes around `reference`.
pub trait LocationResolver: Send + Sync {
    fn resolve(&self, code: &str, reference: Coordinate) -> Result<Location, GeoError>;
}
