//! Persistence port for orders.
//!
//! The order actor writes every accepted mutation through [`OrderRepository`]
//! before replying; queries read from it directly.

pub mod in_memory;

pub use in_memory::InMemoryOrderRepository;

use crate::model::{AgentId, CustomerId, Order, TrackingId};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by an order repository.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The backing store could not be reached. Callers may retry.
    #[error("Order store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts or replaces the order keyed by its tracking id.
    async fn save(&self, order: &Order) -> Result<(), StoreError>;

    async fn find_by_tracking_id(&self, id: &TrackingId) -> Result<Option<Order>, StoreError>;

    async fn find_by_agent(&self, agent: &AgentId) -> Result<Vec<Order>, StoreError>;

    async fn find_by_customer(&self, customer: &CustomerId) -> Result<Vec<Order>, StoreError>;

    /// Every order, newest first.
    async fn all(&self) -> Result<Vec<Order>, StoreError>;
}
