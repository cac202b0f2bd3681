use crate::geo::GeoError;
use crate::order_actor::OrderError;
use crate::store::StoreError;
use thiserror::Error;

/// Every failure an [`OrderService`](super::OrderService) call can report.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// The route is longer than the delivery radius. No order was created.
    #[error("Destination is {distance_meters:.0} m away, beyond the {max_radius_meters:.0} m delivery zone")]
    OutOfDeliveryZone {
        distance_meters: f64,
        max_radius_meters: f64,
    },

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Order(OrderError::Store(e))
    }
}
