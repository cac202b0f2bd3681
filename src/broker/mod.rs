//! Topic-based publish/subscribe for live tracking.
//!
//! Topics are `order:<trackingId>`, `admin` and `agent:<agentId>`. Delivery is
//! best effort and at most once: nothing is buffered for subscribers that
//! join later, and a subscriber whose queue is full misses the event.

pub mod event;
pub mod memory;

pub use event::{Envelope, TrackingEvent};
pub use memory::{InMemoryBroker, Subscription};

use crate::model::{AgentId, TrackingId};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Identifies one subscriber (one viewer connection).
pub type SubscriberId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    Order(TrackingId),
    Admin,
    Agent(AgentId),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TopicError {
    #[error("Unknown topic: {0}")]
    Unknown(String),
}

impl Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::Order(id) => write!(f, "order:{id}"),
            Topic::Admin => f.write_str("admin"),
            Topic::Agent(id) => write!(f, "agent:{id}"),
        }
    }
}

impl FromStr for Topic {
    type Err = TopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || TopicError::Unknown(s.to_string());
        if s == "admin" {
            return Ok(Topic::Admin);
        }
        let (kind, id) = s.split_once(':').ok_or_else(unknown)?;
        if id.is_empty() {
            return Err(unknown());
        }
        match kind {
            "order" => Ok(Topic::Order(TrackingId::from(id))),
            "agent" => Ok(Topic::Agent(AgentId::from(id))),
            _ => Err(unknown()),
        }
    }
}

impl Topic {
    pub fn parse(s: &str) -> Result<Self, TopicError> {
        s.parse()
    }
}

/// The broker seam between lifecycle logic and the real-time transport.
///
/// [`Subscription`] handles call back into `join`, `leave` and `unsubscribe`.
pub trait Broker: Send + Sync + 'static {
    /// Opens a new subscriber with no topics.
    fn subscribe(&self) -> Subscription;

    fn join(&self, subscriber: SubscriberId, topic: Topic);

    fn leave(&self, subscriber: SubscriberId, topic: &Topic);

    /// Removes the subscriber from every topic it joined.
    fn unsubscribe(&self, subscriber: SubscriberId);

    /// Fans `event` out to the current subscribers of `topic` and returns how
    /// many received it.
    fn publish(&self, topic: &Topic, event: TrackingEvent) -> usize;

    /// Opens a subscriber already joined to `topics`.
    fn subscribe_to(&self, topics: impl IntoIterator<Item = Topic>) -> Subscription
    where
        Self: Sized,
    {
        let mut subscription = self.subscribe();
        for topic in topics {
            subscription.join(topic);
        }
        subscription
    }
}
