//! Error types for the Order actor.

use crate::model::{OrderStatus, TrackingId};
use crate::store::StoreError;
use crate::utils::retry::IsTransient;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// No order exists for the tracking id.
    #[error("Order not found: {0}")]
    NotFound(TrackingId),

    /// The requested status change is not an edge of the lifecycle.
    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    /// An agent cannot be assigned in the order's current state.
    #[error("Assignment not allowed while {status}: {reason}")]
    AssignmentNotAllowed { status: OrderStatus, reason: String },

    /// A tick or completion arrived from a run that is no longer registered.
    #[error("No active simulation run for this order")]
    SimulationInactive,

    /// The waypoint is outside the route or behind the cursor.
    #[error("Waypoint {index} is not ahead of the cursor on a route of {len} points")]
    InvalidWaypoint { index: usize, len: usize },

    /// An agent-reported location arrived while the order is not in transit
    /// or while a simulation owns its position.
    #[error("Location reports are not accepted while {0}")]
    LocationNotAccepted(OrderStatus),

    /// Orders are only created with a planned route.
    #[error("Order route must contain at least one waypoint")]
    EmptyRoute,

    /// The order reached a terminal state and can no longer change.
    #[error("Order is {0} and can no longer change")]
    Closed(OrderStatus),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorUnavailable(String),
}

impl IsTransient for OrderError {
    fn is_transient(&self) -> bool {
        matches!(self, OrderError::Store(StoreError::Unavailable(_)))
    }
}
