#![allow(dead_code)]

use async_trait::async_trait;
use order_tracker::broker::{Envelope, Subscription, TrackingEvent};
use order_tracker::config::TrackerConfig;
use order_tracker::geo::{GeoError, PlusCodeResolver, RoutePlan, RoutePlanner};
use order_tracker::lifecycle::TrackingSystem;
use order_tracker::model::{
    AgentId, Coordinate, CustomerId, Order, OrderStatus, PaymentMethod, TrackingId,
};
use order_tracker::service::OrderService;
use order_tracker::store::{InMemoryOrderRepository, OrderRepository, StoreError};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Short code for a point a few hundred metres from the warehouse.
pub const NEARBY_CODE: &str = "7JPX+JJ8";

pub const WAREHOUSE: Coordinate = Coordinate::new(31.28650278795713, 75.64906612235929);

/// `n` waypoints heading north-east from the warehouse.
pub fn straight_route(n: usize) -> Vec<Coordinate> {
    (0..n)
        .map(|i| Coordinate::new(WAREHOUSE.lat + i as f64 * 0.0005, WAREHOUSE.lng + i as f64 * 0.0005))
        .collect()
}

/// Always answers with the same plan.
pub struct FixedRoutePlanner {
    result: Result<RoutePlan, GeoError>,
    pub calls: AtomicU32,
}

impl FixedRoutePlanner {
    pub fn new(waypoints: usize, distance_meters: f64) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(RoutePlan {
                polyline: straight_route(waypoints),
                distance_meters,
                duration_seconds: distance_meters / 10.0,
            }),
            calls: AtomicU32::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: Err(GeoError::RouteUnavailable("engine down".into())),
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl RoutePlanner for FixedRoutePlanner {
    async fn plan(&self, _origin: Coordinate, _destination: Coordinate) -> Result<RoutePlan, GeoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// In-memory repository whose next `n` saves fail as unavailable.
#[derive(Default)]
pub struct FlakyRepository {
    inner: InMemoryOrderRepository,
    failing_saves: AtomicU32,
    pub failed: AtomicU32,
}

impl FlakyRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next_saves(&self, n: u32) {
        self.failing_saves.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderRepository for FlakyRepository {
    async fn save(&self, order: &Order) -> Result<(), StoreError> {
        let should_fail = self
            .failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            self.failed.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("injected".into()));
        }
        self.inner.save(order).await
    }

    async fn find_by_tracking_id(&self, id: &TrackingId) -> Result<Option<Order>, StoreError> {
        self.inner.find_by_tracking_id(id).await
    }

    async fn find_by_agent(&self, agent: &AgentId) -> Result<Vec<Order>, StoreError> {
        self.inner.find_by_agent(agent).await
    }

    async fn find_by_customer(&self, customer: &CustomerId) -> Result<Vec<Order>, StoreError> {
        self.inner.find_by_customer(customer).await
    }

    async fn all(&self) -> Result<Vec<Order>, StoreError> {
        self.inner.all().await
    }
}

pub fn test_config() -> TrackerConfig {
    let mut config = TrackerConfig::default();
    config.simulation.tick_interval_ms = 1000;
    config.simulation.retry.max_attempts = 3;
    config.simulation.retry.initial_delay_ms = 100;
    config
}

pub fn start_system(planner: Arc<FixedRoutePlanner>, repository: Arc<FlakyRepository>) -> TrackingSystem {
    TrackingSystem::start_with_repository(
        &test_config(),
        Arc::new(PlusCodeResolver::new()),
        planner,
        repository,
    )
}

/// Creates a cash order and takes it to `Shipped`.
pub async fn shipped_order(service: &OrderService) -> Order {
    let order = service
        .create(CustomerId::from("alice"), NEARBY_CODE, PaymentMethod::CashOnDelivery)
        .await
        .unwrap();
    service
        .assign(order.tracking_id.clone(), AgentId::from("agent-1"))
        .await
        .unwrap();
    service
        .change_status(order.tracking_id, OrderStatus::Shipped, None)
        .await
        .unwrap()
}

/// Receives until the delivered order arrives, returning everything seen.
pub async fn collect_until_delivered(subscription: &mut Subscription) -> Vec<Envelope> {
    let mut seen = Vec::new();
    loop {
        let envelope = tokio::time::timeout(Duration::from_secs(3600), subscription.recv())
            .await
            .expect("timed out waiting for delivery")
            .expect("broker closed");
        let delivered = matches!(
            envelope.event.as_ref(),
            TrackingEvent::OrderUpdated { order } if order.status == OrderStatus::Delivered
        );
        seen.push(envelope);
        if delivered {
            return seen;
        }
    }
}

pub fn drain(subscription: &mut Subscription) -> Vec<Envelope> {
    std::iter::from_fn(|| subscription.try_recv()).collect()
}

pub fn location_points(events: &[Envelope]) -> Vec<Coordinate> {
    events
        .iter()
        .filter_map(|e| match e.event.as_ref() {
            TrackingEvent::LocationUpdated { lat, lng, .. } => Some(Coordinate::new(*lat, *lng)),
            _ => None,
        })
        .collect()
}
