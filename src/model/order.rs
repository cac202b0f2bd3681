//! The order aggregate and its identifiers.
//!
//! # Actor Framework
//! [`Order`] implements [`ActorEntity`](crate::framework::ActorEntity) in
//! [`crate::order_actor`], which also holds the lifecycle rules that mutate it.
//! This module is plain data.

use crate::model::{Coordinate, Location, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Externally visible order identifier, `TRK-` followed by 12 uppercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(String);

impl TrackingId {
    pub const PREFIX: &'static str = "TRK-";

    /// Generates a fresh id from a v4 uuid.
    pub fn generate() -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", Self::PREFIX, hex[..12].to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackingId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TrackingId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for TrackingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type-safe identifier for delivery agents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type-safe identifier for customers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CashOnDelivery,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// One line of the append-only status ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub status: OrderStatus,
    pub location: String,
    pub timestamp: DateTime<Utc>,
}

/// A delivery from the warehouse to one customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub tracking_id: TrackingId,
    pub customer: CustomerId,
    pub status: OrderStatus,
    pub origin: Location,
    pub destination: Location,
    pub route: Vec<Coordinate>,
    pub distance_meters: f64,
    pub total_duration_secs: f64,
    pub current_location: Location,
    pub assigned_agent: Option<AgentId>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    /// Last waypoint applied by the simulator, and the run that applied it.
    #[serde(skip)]
    pub route_cursor: Option<RouteCursor>,
}

/// Identifies one simulation run. A restarted simulation gets a new id, so
/// requests issued by a stopped run can be told apart from the current one.
pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteCursor {
    pub run_id: RunId,
    pub index: usize,
}

impl Order {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// A cancelled order that was already paid online.
    pub fn requires_refund(&self) -> bool {
        self.status == OrderStatus::Cancelled
            && self.payment_method == PaymentMethod::Online
            && self.payment_status == PaymentStatus::Paid
    }

    pub fn last_history(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}

/// Payload for creating a new order.
///
/// Built by the service after the destination has been resolved, routed and
/// checked against the delivery zone.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer: CustomerId,
    pub payment_method: PaymentMethod,
    pub origin: Location,
    pub destination: Location,
    pub route: Vec<Coordinate>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Field-level update applied through the actor's update path.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub payment_status: Option<PaymentStatus>,
}
