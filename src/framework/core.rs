//! # Core Actor Framework
//!
//! This module defines the generic building blocks the order store is built on.
//!
//! ## Key Types
//!
//! - [`ActorEntity`]: The trait an aggregate implements to be owned by an actor.
//! - [`ResourceActor`]: The single-writer task that owns every live entity.
//! - [`ResourceClient`]: The cloneable handle used to send requests to the actor.
//! - [`FrameworkError`]: Transport-level failures plus boxed entity errors.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any aggregate must implement to be managed by [`ResourceActor`].
///
/// # Architecture Note
/// The actor loop is written once; the aggregate supplies the behaviour through
/// associated types (`Create`, `Update`, `Action`) and async hooks. An `Order`
/// requires an `OrderCreate` payload and the compiler rejects anything else.
///
/// # Async & Context
/// Hooks receive the injected `Context`, which carries the dependencies the
/// aggregate needs while mutating (repository, simulation registry). Context is
/// handed to [`ResourceActor::run`] rather than to `new`, so components that
/// depend on each other can be created before any of them starts.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing aggregate-specific operations.
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    type Context: Send + Sync;

    /// The error type returned by hooks.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full entity from the generated id and the payload.
    /// Called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called after construction and before the entity is stored.
    /// Returning an error discards the entity.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    // --- Action Handler (Async) ---

    /// Handle an aggregate-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}

// =============================================================================
// 2. THE GENERIC MESSAGES & ERRORS
// =============================================================================

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("No unused id after {0} attempts")]
    IdsExhausted(usize),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Recovers the typed entity error carried by [`FrameworkError::EntityError`].
    ///
    /// Any other variant, or an entity error of a different type, is handed back
    /// unchanged in `Err`.
    pub fn into_entity_error<E>(self) -> Result<E, FrameworkError>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match self {
            FrameworkError::EntityError(inner) => match inner.downcast::<E>() {
                Ok(typed) => Ok(*typed),
                Err(other) => Err(FrameworkError::EntityError(other)),
            },
            other => Err(other),
        }
    }
}

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Request sent to a [`ResourceActor`].
///
/// The variants are the resource lifecycle (create, read, update) plus
/// `Action` for aggregate-specific operations. Entities are never removed:
/// a finished order is retained for historical queries.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// The generic actor that owns a collection of entities.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the `store` and the
/// receiver end of the channel and processes one request at a time, so every
/// mutation of a given entity is serialized without a lock around the store.
///
/// Mutating hooks run against a *copy* of the entity; the copy replaces the
/// stored value only when the hook succeeds. A failed hook therefore leaves
/// the stored entity exactly as it was.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

/// Generated ids that collide with a live entity are drawn again, up to this many times.
pub const MAX_ID_ATTEMPTS: usize = 8;

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// * `buffer_size` - capacity of the request channel; senders wait when it is full.
    /// * `next_id_fn` - generates the id of each created entity.
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        (actor, ResourceClient::new(sender))
    }

    fn unused_id(&self) -> Option<T::Id> {
        (0..MAX_ID_ATTEMPTS)
            .map(|_| (self.next_id_fn)())
            .find(|id| !self.store.contains_key(id))
    }

    /// Runs the actor's event loop until every client has been dropped.
    ///
    /// # Context Injection
    /// `context` is passed to every entity hook.
    pub async fn run(mut self, context: T::Context) {
        // "Order" rather than "order_tracker::model::order::Order"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let Some(id) = self.unused_id() else {
                        warn!(entity_type, attempts = MAX_ID_ATTEMPTS, "No unused id");
                        let _ = respond_to.send(Err(FrameworkError::IdsExhausted(MAX_ID_ATTEMPTS)));
                        continue;
                    };

                    let mut item = match T::from_create_params(id.clone(), params) {
                        Ok(item) => item,
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                    };
                    if let Err(e) = item.on_create(&context).await {
                        warn!(entity_type, %id, error = %e, "on_create failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.store.insert(id.clone(), item.clone());
                    info!(entity_type, %id, size = self.store.len(), "Created");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(current) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut draft = current.clone();
                    match draft.on_update(update, &context).await {
                        Ok(()) => {
                            self.store.insert(id.clone(), draft.clone());
                            info!(entity_type, %id, "Updated");
                            let _ = respond_to.send(Ok(draft));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(current) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut draft = current.clone();
                    match draft.handle_action(action, &context).await {
                        Ok(result) => {
                            self.store.insert(id.clone(), draft);
                            debug!(entity_type, %id, "Action ok");
                            let _ = respond_to.send(Ok(result));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Action failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A type-safe client for interacting with a `ResourceActor`.
///
/// Holds only the channel sender, so cloning is cheap.
pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn create(&self, params: T::Create) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Create { params, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Get { id, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Update {
                id,
                update,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Action {
                id,
                action,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
