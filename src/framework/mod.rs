//! Generic single-writer actor used as the live order store.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait an aggregate implements to be managed by an actor
//! - [`ResourceActor`] - The task that owns every entity and serializes mutations
//! - [`ResourceClient`] - Cloneable handle for sending requests to the actor
//! - [`FrameworkError`] - Channel failures and boxed entity errors
//!
//! # Testing
//!
//! See [`mock`] for utilities to test clients without spawning an actor.

pub mod core;
pub mod mock;

pub use core::*;
