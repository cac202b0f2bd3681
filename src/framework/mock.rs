//! # Mock Framework & Testing Guide
//!
//! [`MockClient<T>`] hands out a real [`ResourceClient<T>`] whose requests are
//! answered from a queue of expectations instead of by an actor. Use it to
//! test client wrappers (error mapping, result unpacking) deterministically
//! and to inject failures that are awkward to provoke with a live actor.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **Determinism** | Fully deterministic | Subject to scheduler |
//! | **State** | Expectations only | Real state management |
//! | **Use Case** | Logic *around* the client | The actor itself or the full system |
//! | **Error Injection** | `return_err` | Requires specific state |
//!
//! ```rust,ignore
//! let mut mock = MockClient::<Order>::new();
//! mock.expect_action().return_err(FrameworkError::ActorClosed);
//! let client = OrderClient::new(mock.client());
//! assert!(client.transition(id, OrderStatus::Packed, None).await.is_err());
//! mock.verify();
//! ```
//!
//! For the lower-level style, [`create_mock_client`] returns the client and the
//! raw request receiver so a test can inspect each request and answer it by hand.

use crate::framework::core::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the response to return for it.
enum Expectation<T: ActorEntity> {
    Get {
        response: Result<Option<T>, FrameworkError>,
    },
    Create {
        response: Result<T, FrameworkError>,
    },
    Update {
        response: Result<T, FrameworkError>,
    },
    Action {
        response: Result<T::ActionResult, FrameworkError>,
    },
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking.
///
/// Expectations are consumed in order. A request that does not match the next
/// expectation panics inside the mock task, which surfaces in the test as
/// `FrameworkError::ActorDropped`.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Expectations<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queue.lock().pop_front();
                match (request, expectation) {
                    (ResourceRequest::Get { respond_to, .. }, Some(Expectation::Get { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Create { respond_to, .. },
                        Some(Expectation::Create { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Update { respond_to, .. },
                        Some(Expectation::Update { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { respond_to, .. },
                        Some(Expectation::Action { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    _ => panic!("Unexpected request or expectation mismatch"),
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Expects a `get` request.
    pub fn expect_get(&mut self) -> ExpectationBuilder<T, Option<T>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Get { response })
    }

    /// Expects a `create` request.
    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Create {
            response,
        })
    }

    /// Expects an `update` request.
    pub fn expect_update(&mut self) -> ExpectationBuilder<T, T> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Update {
            response,
        })
    }

    /// Expects an `action` request.
    pub fn expect_action(&mut self) -> ExpectationBuilder<T, T::ActionResult> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Action {
            response,
        })
    }

    /// Panics unless every expectation has been consumed.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().len();
        if remaining != 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

/// Builder that records the response for one expected request.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Expectations<T>,
    wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    fn new(expectations: Expectations<T>, wrap: fn(Result<R, FrameworkError>) -> Expectation<T>) -> Self {
        Self { expectations, wrap }
    }

    /// Answers the request successfully.
    pub fn return_ok(self, value: R) {
        self.expectations.lock().push_back((self.wrap)(Ok(value)));
    }

    /// Answers the request with an error.
    pub fn return_err(self, error: FrameworkError) {
        self.expectations.lock().push_back((self.wrap)(Err(error)));
    }
}

// =============================================================================
// RAW CHANNEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Waits for the next request and returns it if it is an `Action`.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    tokio::sync::oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}
