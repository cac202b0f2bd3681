use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Lifecycle state of an order.
///
/// ```text
/// Ordered -> Packed -> Shipped -> OutForDelivery -> Delivered
/// Ordered -> Cancelled
/// Packed  -> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Ordered,
    Packed,
    Shipped,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Ordered,
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Whether `self -> next` is an edge of the lifecycle graph.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Ordered, Packed)
                | (Packed, Shipped)
                | (Shipped, OutForDelivery)
                | (OutForDelivery, Delivered)
                | (Ordered, Cancelled)
                | (Packed, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Agents may be (re)assigned only before the order leaves the warehouse.
    pub fn allows_assignment(self) -> bool {
        matches!(self, OrderStatus::Ordered | OrderStatus::Packed)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Ordered => "Ordered",
            OrderStatus::Packed => "Packed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}
