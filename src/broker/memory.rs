//! Single-process broker over bounded `tokio` channels.

use super::{Broker, Envelope, SubscriberId, Topic, TrackingEvent};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

struct Subscriber {
    sender: mpsc::Sender<Envelope>,
    topics: HashSet<Topic>,
}

#[derive(Default)]
struct BrokerState {
    next_id: SubscriberId,
    subscribers: HashMap<SubscriberId, Subscriber>,
    topics: HashMap<Topic, HashSet<SubscriberId>>,
}

impl BrokerState {
    fn remove_subscriber(&mut self, id: SubscriberId) -> bool {
        let Some(subscriber) = self.subscribers.remove(&id) else {
            return false;
        };
        for topic in subscriber.topics {
            if let Some(members) = self.topics.get_mut(&topic) {
                members.remove(&id);
                if members.is_empty() {
                    self.topics.remove(&topic);
                }
            }
        }
        true
    }
}

/// In-memory [`Broker`]. Each subscriber owns one bounded queue.
pub struct InMemoryBroker {
    this: Weak<InMemoryBroker>,
    buffer: usize,
    state: Mutex<BrokerState>,
}

impl InMemoryBroker {
    /// `buffer` is the queue capacity per subscriber.
    pub fn new(buffer: usize) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            buffer: buffer.max(1),
            state: Mutex::new(BrokerState::default()),
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    pub fn topic_subscribers(&self, topic: &Topic) -> usize {
        self.state.lock().topics.get(topic).map_or(0, HashSet::len)
    }
}

impl Broker for InMemoryBroker {
    fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.subscribers.insert(
            id,
            Subscriber {
                sender,
                topics: HashSet::new(),
            },
        );
        debug!(subscriber = id, "Subscriber connected");
        let broker: Weak<dyn Broker> = self.this.clone();
        Subscription {
            id,
            receiver,
            topics: HashSet::new(),
            broker,
        }
    }

    fn join(&self, subscriber: SubscriberId, topic: Topic) {
        let mut state = self.state.lock();
        let Some(entry) = state.subscribers.get_mut(&subscriber) else {
            return;
        };
        if entry.topics.insert(topic.clone()) {
            debug!(subscriber, %topic, "Joined");
            state.topics.entry(topic).or_default().insert(subscriber);
        }
    }

    fn leave(&self, subscriber: SubscriberId, topic: &Topic) {
        let mut state = self.state.lock();
        let Some(entry) = state.subscribers.get_mut(&subscriber) else {
            return;
        };
        if entry.topics.remove(topic) {
            debug!(subscriber, %topic, "Left");
            if let Some(members) = state.topics.get_mut(topic) {
                members.remove(&subscriber);
                if members.is_empty() {
                    state.topics.remove(topic);
                }
            }
        }
    }

    fn unsubscribe(&self, subscriber: SubscriberId) {
        if self.state.lock().remove_subscriber(subscriber) {
            debug!(subscriber, "Subscriber disconnected");
        }
    }

    fn publish(&self, topic: &Topic, event: TrackingEvent) -> usize {
        let mut state = self.state.lock();
        let Some(members) = state.topics.get(topic) else {
            return 0;
        };
        let event = Arc::new(event);
        let mut delivered = 0;
        let mut closed = Vec::new();
        for id in members {
            let Some(subscriber) = state.subscribers.get(id) else {
                continue;
            };
            let envelope = Envelope {
                topic: topic.clone(),
                event: event.clone(),
            };
            match subscriber.sender.try_send(envelope) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(subscriber = id, %topic, event = event.name(), "Subscriber queue full, event dropped");
                }
                Err(TrySendError::Closed(_)) => closed.push(*id),
            }
        }
        for id in closed {
            state.remove_subscriber(id);
            debug!(subscriber = id, %topic, "Pruned closed subscriber");
        }
        delivered
    }
}

/// A subscriber handle. Dropping it unsubscribes from every topic.
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<Envelope>,
    topics: HashSet<Topic>,
    broker: Weak<dyn Broker>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn join(&mut self, topic: Topic) {
        if let Some(broker) = self.broker.upgrade() {
            broker.join(self.id, topic.clone());
            self.topics.insert(topic);
        }
    }

    pub fn leave(&mut self, topic: &Topic) {
        if let Some(broker) = self.broker.upgrade() {
            broker.leave(self.id, topic);
        }
        self.topics.remove(topic);
    }

    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    /// Waits for the next event. Returns `None` once the broker is gone and
    /// the queue is drained.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(broker) = self.broker.upgrade() {
            broker.unsubscribe(self.id);
        }
    }
}
