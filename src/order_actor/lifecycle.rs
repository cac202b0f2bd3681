//! Lifecycle rules for the [`Order`] aggregate.
//!
//! Every rule validates before it mutates, so an `Err` leaves the order as it
//! was. The actor additionally runs each rule against a copy.

use super::OrderError;
use crate::model::{
    AgentId, HistoryEntry, Location, Order, OrderCreate, OrderStatus, PaymentMethod,
    PaymentStatus, RouteCursor, RunId, TrackingId,
};
use chrono::Utc;

fn history_label(location: &Location) -> String {
    location
        .label
        .clone()
        .unwrap_or_else(|| location.coordinate.to_string())
}

impl Order {
    /// Builds a new `Ordered` order with its creation entry in the history.
    pub fn place(tracking_id: TrackingId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.route.is_empty() {
            return Err(OrderError::EmptyRoute);
        }
        let now = Utc::now();
        let history = vec![HistoryEntry {
            status: OrderStatus::Ordered,
            location: history_label(&params.origin),
            timestamp: now,
        }];
        Ok(Self {
            tracking_id,
            customer: params.customer,
            status: OrderStatus::Ordered,
            current_location: params.origin.clone(),
            origin: params.origin,
            destination: params.destination,
            route: params.route,
            distance_meters: params.distance_meters,
            total_duration_secs: params.duration_seconds,
            assigned_agent: None,
            payment_method: params.payment_method,
            payment_status: PaymentStatus::Pending,
            history,
            created_at: now,
            route_cursor: None,
        })
    }

    /// Follows one edge of the lifecycle and appends exactly one history entry.
    ///
    /// The entry is labelled with `location` when given, otherwise with the
    /// current location.
    pub fn transition(
        &mut self,
        to: OrderStatus,
        location: Option<Location>,
    ) -> Result<(), OrderError> {
        if !self.status.can_transition_to(to) {
            return Err(OrderError::IllegalTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        if let Some(location) = location {
            self.current_location = location;
        }
        self.history.push(HistoryEntry {
            status: to,
            location: history_label(&self.current_location),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Sets the agent. An `Ordered` order is packed in the same step.
    pub fn assign(&mut self, agent: AgentId) -> Result<(), OrderError> {
        if !self.status.allows_assignment() {
            return Err(OrderError::AssignmentNotAllowed {
                status: self.status,
                reason: "order has left the warehouse".to_string(),
            });
        }
        if self.payment_method == PaymentMethod::Online
            && self.payment_status != PaymentStatus::Paid
        {
            return Err(OrderError::AssignmentNotAllowed {
                status: self.status,
                reason: "online payment has not been received".to_string(),
            });
        }
        if self.status == OrderStatus::Ordered {
            self.transition(OrderStatus::Packed, None)?;
        }
        self.assigned_agent = Some(agent);
        Ok(())
    }

    /// Moves the current location to waypoint `index` on behalf of `run_id`.
    ///
    /// Within one run the cursor only moves forward; skipped waypoints stay
    /// skipped. A new run starts over from any waypoint.
    pub fn advance_to(&mut self, run_id: RunId, index: usize) -> Result<Location, OrderError> {
        if self.status != OrderStatus::OutForDelivery {
            return Err(OrderError::SimulationInactive);
        }
        let ahead = match self.route_cursor {
            Some(cursor) if cursor.run_id == run_id => index > cursor.index,
            _ => true,
        };
        let Some(waypoint) = self.route.get(index).copied().filter(|_| ahead) else {
            return Err(OrderError::InvalidWaypoint {
                index,
                len: self.route.len(),
            });
        };
        self.route_cursor = Some(RouteCursor { run_id, index });
        self.current_location = Location::unlabeled(waypoint);
        Ok(self.current_location.clone())
    }

    /// Marks the order delivered at the end of its route.
    pub fn complete_delivery(&mut self) -> Result<(), OrderError> {
        let end = self
            .route
            .last()
            .copied()
            .unwrap_or(self.destination.coordinate);
        let arrival = Location {
            coordinate: end,
            label: self.destination.label.clone(),
        };
        self.transition(OrderStatus::Delivered, Some(arrival))
    }

    pub fn record_payment(&mut self, status: PaymentStatus) -> Result<(), OrderError> {
        if self.is_terminal() {
            return Err(OrderError::Closed(self.status));
        }
        self.payment_status = status;
        Ok(())
    }
}
