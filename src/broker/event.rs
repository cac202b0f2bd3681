use super::Topic;
use crate::model::{AgentId, Location, Order, TrackingId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Payloads published on tracking topics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackingEvent {
    OrderCreated {
        order: Order,
    },
    OrderUpdated {
        order: Order,
    },
    /// Kept small on purpose; sent on every simulation tick.
    LocationUpdated {
        tracking_id: TrackingId,
        lat: f64,
        lng: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    AgentAssigned {
        tracking_id: TrackingId,
        agent_id: AgentId,
        order: Order,
    },
}

impl TrackingEvent {
    pub fn location(tracking_id: TrackingId, location: &Location) -> Self {
        TrackingEvent::LocationUpdated {
            tracking_id,
            lat: location.coordinate.lat,
            lng: location.coordinate.lng,
            label: location.label.clone(),
        }
    }

    pub fn tracking_id(&self) -> &TrackingId {
        match self {
            TrackingEvent::OrderCreated { order } | TrackingEvent::OrderUpdated { order } => {
                &order.tracking_id
            }
            TrackingEvent::LocationUpdated { tracking_id, .. }
            | TrackingEvent::AgentAssigned { tracking_id, .. } => tracking_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TrackingEvent::OrderCreated { .. } => "order_created",
            TrackingEvent::OrderUpdated { .. } => "order_updated",
            TrackingEvent::LocationUpdated { .. } => "location_updated",
            TrackingEvent::AgentAssigned { .. } => "agent_assigned",
        }
    }
}

/// One delivered event. The payload is shared between all recipients.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub topic: Topic,
    pub event: Arc<TrackingEvent>,
}

#[derive(Serialize)]
struct Wire<'a> {
    topic: String,
    #[serde(flatten)]
    event: &'a TrackingEvent,
}

impl Envelope {
    /// The transport form: `{"topic": "...", "event": "...", ...payload}`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Wire {
            topic: self.topic.to_string(),
            event: self.event.as_ref(),
        })
    }
}
