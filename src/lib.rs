//! # Order Tracker
//!
//! Geofenced delivery orders with live tracking.
//!
//! A customer shares a plus code. The tracker resolves it, routes from the
//! warehouse and rejects destinations beyond the delivery radius. Orders then
//! move through a fixed lifecycle:
//!
//! ```text
//! Ordered -> Packed -> Shipped -> OutForDelivery -> Delivered
//! Ordered -> Cancelled
//! Packed  -> Cancelled
//! ```
//!
//! While an order is out for delivery a simulator walks its route one
//! waypoint per tick. Every change is published on topics for the customer
//! (`order:<id>`), the fleet dashboard (`admin`) and the assigned agent
//! (`agent:<id>`).
//!
//! ## Architecture Notes
//!
//! ### 1. One writer per aggregate
//! Every live [`Order`](model::Order) is owned by a single
//! [`ResourceActor`](framework::ResourceActor) task. Service calls and
//! simulation ticks are both messages to it, so no two mutations of an order
//! ever overlap and there is no lock around order state.
//!
//! ### 2. Async context injection
//! Dependencies reach the actor through `run(context)`: the
//! [`OrderContext`](order_actor::OrderContext) carries the repository and the
//! [`SimulationRegistry`](simulation::SimulationRegistry). The registry is how
//! the actor refuses ticks from a run that has been stopped.
//!
//! ### 3. Typed errors
//! Each layer has its own `thiserror` enum. Entity errors travel through the
//! framework boxed and are downcast back to [`OrderError`](order_actor::OrderError)
//! at the client.
//!
//! ### 4. Observability
//! `tracing` everywhere with structured fields. See [`lifecycle::tracing`].
//!
//! ## Module Tour
//!
//! - [`framework`] - generic actor, client and mock
//! - [`order_actor`] / [`clients`] - the order aggregate's actor and typed client
//! - [`geo`] - plus codes, routing, delivery zone
//! - [`broker`] - topic pub/sub
//! - [`simulation`] - per-order motion tasks
//! - [`service`] - the request-facing API
//! - [`lifecycle`] - wiring, shutdown, logging
//! - [`config`] - TOML configuration
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run -- --code 7JPX+JJ8
//! ```

pub mod broker;
pub mod clients;
pub mod config;
pub mod framework;
pub mod geo;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod service;
pub mod simulation;
pub mod store;
pub mod utils;
