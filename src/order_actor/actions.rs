//! Custom actions for the Order actor.
//!
//! Status changes, assignment and location updates are expressed as
//! [`OrderAction`]s and handled by
//! [`ActorEntity::handle_action`](crate::framework::ActorEntity::handle_action)
//! inside the actor, so they are serialized per order.

use crate::model::{AgentId, Location, Order, OrderStatus};
use crate::simulation::RunId;

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Moves the order along one lifecycle edge, optionally relocating it.
    Transition {
        to: OrderStatus,
        location: Option<Location>,
    },
    /// Sets the delivery agent, packing the order if it is still `Ordered`.
    Assign { agent: AgentId },
    /// Applies waypoint `index` on behalf of simulation run `run_id`.
    Advance { run_id: RunId, index: usize },
    /// Final transition to `Delivered` on behalf of simulation run `run_id`.
    CompleteDelivery { run_id: RunId },
    /// A position reported by the delivery agent.
    ReportLocation { location: Location },
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    Transition(Order),
    Assign(Order),
    Advance(Location),
    CompleteDelivery(Order),
    ReportLocation(Location),
}
