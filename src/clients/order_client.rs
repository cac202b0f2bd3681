//! # Order Client
//!
//! Typed API over the order actor. Entity errors coming back through the
//! framework are recovered as [`OrderError`] so callers can match on them.

use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{
    AgentId, Location, Order, OrderCreate, OrderStatus, OrderUpdate, PaymentStatus, TrackingId,
};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
use crate::simulation::RunId;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

fn unexpected(result: OrderActionResult) -> OrderError {
    OrderError::ActorUnavailable(format!("mismatched action result: {result:?}"))
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params), fields(customer = %params.customer))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<Order, OrderError> {
        debug!(?params, "create_order called");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    async fn act(&self, id: TrackingId, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, location))]
    pub async fn transition(
        &self,
        id: TrackingId,
        to: OrderStatus,
        location: Option<Location>,
    ) -> Result<Order, OrderError> {
        match self.act(id, OrderAction::Transition { to, location }).await? {
            OrderActionResult::Transition(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn assign(&self, id: TrackingId, agent: AgentId) -> Result<Order, OrderError> {
        match self.act(id, OrderAction::Assign { agent }).await? {
            OrderActionResult::Assign(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    /// Applies one simulation tick. Only the run currently registered for the
    /// order is accepted.
    #[instrument(skip(self))]
    pub async fn advance(&self, id: TrackingId, run_id: RunId, index: usize) -> Result<Location, OrderError> {
        match self.act(id, OrderAction::Advance { run_id, index }).await? {
            OrderActionResult::Advance(location) => Ok(location),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn complete_delivery(&self, id: TrackingId, run_id: RunId) -> Result<Order, OrderError> {
        match self.act(id, OrderAction::CompleteDelivery { run_id }).await? {
            OrderActionResult::CompleteDelivery(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn report_location(&self, id: TrackingId, location: Location) -> Result<Location, OrderError> {
        match self.act(id, OrderAction::ReportLocation { location }).await? {
            OrderActionResult::ReportLocation(location) => Ok(location),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn record_payment(&self, id: TrackingId, status: PaymentStatus) -> Result<Order, OrderError> {
        let update = OrderUpdate {
            payment_status: Some(status),
        };
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Fetches the order, treating a missing id as [`OrderError::NotFound`].
    pub async fn fetch(&self, id: TrackingId) -> Result<Order, OrderError> {
        self.get(id.clone()).await?.ok_or(OrderError::NotFound(id))
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.into_entity_error::<OrderError>() {
            Ok(typed) => typed,
            Err(FrameworkError::NotFound(id)) => OrderError::NotFound(TrackingId::from(id)),
            Err(other) => OrderError::ActorUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_action, MockClient};
    use crate::model::Coordinate;
    use crate::store::StoreError;

    #[tokio::test]
    async fn test_advance_sends_run_and_index() {
        let (client, mut receiver) = create_mock_client::<Order>(10);
        let order_client = OrderClient::new(client);

        let task = tokio::spawn(async move {
            order_client
                .advance(TrackingId::from("TRK-1"), 7, 3)
                .await
        });

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, TrackingId::from("TRK-1"));
        assert!(matches!(action, OrderAction::Advance { run_id: 7, index: 3 }));

        let here = Location::unlabeled(Coordinate::new(31.2, 75.6));
        responder
            .send(Ok(OrderActionResult::Advance(here.clone())))
            .unwrap();
        assert_eq!(task.await.unwrap().unwrap(), here);
    }

    #[tokio::test]
    async fn test_entity_error_is_recovered_typed() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_action()
            .return_err(FrameworkError::EntityError(Box::new(
                OrderError::IllegalTransition {
                    from: OrderStatus::Shipped,
                    to: OrderStatus::Cancelled,
                },
            )));
        let client = OrderClient::new(mock.client());

        let err = client
            .transition(TrackingId::from("TRK-1"), OrderStatus::Cancelled, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            OrderError::IllegalTransition {
                from: OrderStatus::Shipped,
                to: OrderStatus::Cancelled
            }
        );
        mock.verify();
    }

    #[tokio::test]
    async fn test_framework_errors_are_mapped() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_action()
            .return_err(FrameworkError::NotFound("TRK-404".to_string()));
        mock.expect_update()
            .return_err(FrameworkError::EntityError(Box::new(OrderError::Store(
                StoreError::Unavailable("disk".into()),
            ))));
        mock.expect_get().return_err(FrameworkError::ActorClosed);
        let client = OrderClient::new(mock.client());

        let not_found = client
            .assign(TrackingId::from("TRK-404"), AgentId::from("a"))
            .await
            .unwrap_err();
        assert_eq!(not_found, OrderError::NotFound(TrackingId::from("TRK-404")));

        let store = client
            .record_payment(TrackingId::from("TRK-1"), PaymentStatus::Paid)
            .await
            .unwrap_err();
        assert!(matches!(store, OrderError::Store(_)));

        let closed = client.get(TrackingId::from("TRK-1")).await.unwrap_err();
        assert!(matches!(closed, OrderError::ActorUnavailable(_)));
        mock.verify();
    }
}
