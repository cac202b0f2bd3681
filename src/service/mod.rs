//! # Order Service
//!
//! The request-facing API. Each call validates, applies the change through
//! the order actor, publishes the result and starts or stops the simulator.
//!
//! | Call | Publishes to |
//! |------|--------------|
//! | [`create`](OrderService::create) | `admin` |
//! | [`change_status`](OrderService::change_status), [`cancel`](OrderService::cancel), [`record_payment`](OrderService::record_payment) | `order:<id>`, `admin` |
//! | [`assign`](OrderService::assign) | `order:<id>`, `admin`, `agent:<id>` |
//! | [`report_location`](OrderService::report_location) | `order:<id>`, `admin` |

pub mod error;

pub use error::ServiceError;

use crate::broker::{Broker, Topic, TrackingEvent};
use crate::clients::OrderClient;
use crate::geo::{DeliveryZoneGuard, LocationResolver, RoutePlanner, ZoneCheck};
use crate::model::{
    AgentId, CustomerId, Location, Order, OrderCreate, OrderStatus, PaymentMethod, PaymentStatus,
    TrackingId,
};
use crate::order_actor::OrderError;
use crate::simulation::MotionSimulator;
use crate::store::OrderRepository;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct OrderService {
    orders: OrderClient,
    repository: Arc<dyn OrderRepository>,
    resolver: Arc<dyn LocationResolver>,
    planner: Arc<dyn RoutePlanner>,
    zone: DeliveryZoneGuard,
    warehouse: Location,
    broker: Arc<dyn Broker>,
    simulator: MotionSimulator,
}

/// Collaborators an [`OrderService`] is wired from.
pub struct ServiceParts {
    pub orders: OrderClient,
    pub repository: Arc<dyn OrderRepository>,
    pub resolver: Arc<dyn LocationResolver>,
    pub planner: Arc<dyn RoutePlanner>,
    pub zone: DeliveryZoneGuard,
    pub warehouse: Location,
    pub broker: Arc<dyn Broker>,
    pub simulator: MotionSimulator,
}

impl OrderService {
    pub fn new(parts: ServiceParts) -> Self {
        Self {
            orders: parts.orders,
            repository: parts.repository,
            resolver: parts.resolver,
            planner: parts.planner,
            zone: parts.zone,
            warehouse: parts.warehouse,
            broker: parts.broker,
            simulator: parts.simulator,
        }
    }

    pub fn warehouse(&self) -> &Location {
        &self.warehouse
    }

    fn publish_order(&self, order: &Order) {
        let event = TrackingEvent::OrderUpdated {
            order: order.clone(),
        };
        self.broker
            .publish(&Topic::Order(order.tracking_id.clone()), event.clone());
        self.broker.publish(&Topic::Admin, event);
    }

    fn publish_location(&self, id: &TrackingId, location: &Location) {
        let event = TrackingEvent::location(id.clone(), location);
        self.broker.publish(&Topic::Order(id.clone()), event.clone());
        self.broker.publish(&Topic::Admin, event);
    }

    /// Places an order for delivery to `code`.
    ///
    /// Resolution, routing and the zone check all happen before anything is
    /// stored, so a failure leaves no order behind and publishes nothing.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        customer: CustomerId,
        code: &str,
        payment_method: PaymentMethod,
    ) -> Result<Order, ServiceError> {
        let origin = self.warehouse.coordinate;
        let destination = self.resolver.resolve(code, origin)?;
        let plan = self.planner.plan(origin, destination.coordinate).await?;

        if let ZoneCheck::Rejected { distance_meters } = self.zone.check(plan.distance_meters) {
            info!(distance_meters, "Destination outside delivery zone");
            return Err(ServiceError::OutOfDeliveryZone {
                distance_meters,
                max_radius_meters: self.zone.max_radius_meters(),
            });
        }

        let order = self
            .orders
            .create_order(OrderCreate {
                customer,
                payment_method,
                origin: self.warehouse.clone(),
                destination,
                route: plan.polyline,
                distance_meters: plan.distance_meters,
                duration_seconds: plan.duration_seconds,
            })
            .await?;
        info!(tracking_id = %order.tracking_id, distance_meters = order.distance_meters, "Order placed");

        self.broker.publish(
            &Topic::Admin,
            TrackingEvent::OrderCreated {
                order: order.clone(),
            },
        );
        Ok(order)
    }

    /// Moves the order along one lifecycle edge.
    ///
    /// Entering `OutForDelivery` starts the simulator. `Delivered` or
    /// `Cancelled` stop a running simulation before the transition is applied.
    #[instrument(skip(self, location))]
    pub async fn change_status(
        &self,
        id: TrackingId,
        to: OrderStatus,
        location: Option<Location>,
    ) -> Result<Order, ServiceError> {
        if to.is_terminal() && self.simulator.is_active(&id) {
            let current = self.orders.fetch(id.clone()).await?;
            if !current.status.can_transition_to(to) {
                return Err(OrderError::IllegalTransition {
                    from: current.status,
                    to,
                }
                .into());
            }
            self.simulator.stop(&id).await;
        }

        let order = self.orders.transition(id, to, location).await?;
        info!(tracking_id = %order.tracking_id, status = %order.status, "Status changed");
        self.publish_order(&order);

        if order.status == OrderStatus::OutForDelivery {
            self.simulator.start(&order);
        }
        Ok(order)
    }

    /// Cancels an order that has not left the warehouse.
    pub async fn cancel(&self, id: TrackingId) -> Result<Order, ServiceError> {
        self.change_status(id, OrderStatus::Cancelled, None).await
    }

    /// Assigns a delivery agent, packing the order if it is still `Ordered`.
    #[instrument(skip(self))]
    pub async fn assign(&self, id: TrackingId, agent: AgentId) -> Result<Order, ServiceError> {
        let order = self.orders.assign(id, agent.clone()).await?;
        info!(tracking_id = %order.tracking_id, agent = %agent, status = %order.status, "Agent assigned");
        self.publish_order(&order);
        self.broker.publish(
            &Topic::Agent(agent.clone()),
            TrackingEvent::AgentAssigned {
                tracking_id: order.tracking_id.clone(),
                agent_id: agent,
                order: order.clone(),
            },
        );
        Ok(order)
    }

    /// Entry point for the payment collaborator.
    #[instrument(skip(self))]
    pub async fn record_payment(
        &self,
        id: TrackingId,
        status: PaymentStatus,
    ) -> Result<Order, ServiceError> {
        let order = self.orders.record_payment(id, status).await?;
        self.publish_order(&order);
        Ok(order)
    }

    /// Relays a position reported by the delivery agent.
    #[instrument(skip(self))]
    pub async fn report_location(
        &self,
        id: TrackingId,
        location: Location,
    ) -> Result<Location, ServiceError> {
        let location = self.orders.report_location(id.clone(), location).await?;
        self.publish_location(&id, &location);
        Ok(location)
    }

    pub async fn get(&self, id: TrackingId) -> Result<Order, ServiceError> {
        self.repository
            .find_by_tracking_id(&id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id).into())
    }

    pub async fn orders_for_customer(&self, customer: &CustomerId) -> Result<Vec<Order>, ServiceError> {
        Ok(self.repository.find_by_customer(customer).await?)
    }

    pub async fn orders_for_agent(&self, agent: &AgentId) -> Result<Vec<Order>, ServiceError> {
        Ok(self.repository.find_by_agent(agent).await?)
    }

    /// Admin listing, newest first.
    pub async fn all_orders(&self) -> Result<Vec<Order>, ServiceError> {
        Ok(self.repository.all().await?)
    }

    pub fn simulator(&self) -> &MotionSimulator {
        &self.simulator
    }
}
