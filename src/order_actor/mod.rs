//! # Order Actor
//!
//! The single writer for every live [`Order`]. All mutations of an order,
//! whether they come from the service or from a simulation tick, are
//! messages to this actor and are applied one at a time.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](crate::framework::ActorEntity) implementation for [`Order`]
//! - [`lifecycle`] - the state machine and assignment rules
//! - [`actions`] - [`OrderAction`] and [`OrderActionResult`]
//! - [`error`] - [`OrderError`]
//! - [`new()`] - factory that creates the actor and its client
//!
//! ## Usage
//!
//! ```rust,ignore
//! let (actor, client) = order_actor::new(32);
//! tokio::spawn(actor.run(OrderContext { repository, simulations }));
//! let order = client.create_order(params).await?;
//! ```

pub mod actions;
pub mod entity;
pub mod error;
pub mod lifecycle;

pub use actions::*;
pub use error::*;

use crate::clients::OrderClient;
use crate::framework::ResourceActor;
use crate::model::{Order, TrackingId};
use crate::simulation::SimulationRegistry;
use crate::store::OrderRepository;
use std::sync::Arc;

/// Dependencies injected into the order actor at `run`.
#[derive(Clone)]
pub struct OrderContext {
    pub repository: Arc<dyn OrderRepository>,
    /// Consulted to reject ticks from runs that have been stopped.
    pub simulations: SimulationRegistry,
}

/// Creates a new Order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size, TrackingId::generate);
    (actor, OrderClient::new(generic_client))
}
