use crate::broker::{Broker, InMemoryBroker};
use crate::config::TrackerConfig;
use crate::geo::{DeliveryZoneGuard, LocationResolver, RoutePlanner};
use crate::order_actor::{self, OrderContext};
use crate::service::{OrderService, ServiceParts};
use crate::simulation::{MotionSimulator, SimulationRegistry, SimulationSettings};
use crate::store::{InMemoryOrderRepository, OrderRepository};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

const ORDER_ACTOR_BUFFER: usize = 64;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Actor task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// The running tracker: order actor, simulator, broker and service.
///
/// # Example
///
/// ```ignore
/// let system = TrackingSystem::start(&config, resolver, planner);
/// let mut viewer = system.broker.subscribe_to([Topic::Admin]);
/// let order = system.service.create(customer, "7JPX+JJ8", PaymentMethod::CashOnDelivery).await?;
/// system.shutdown().await?;
/// ```
pub struct TrackingSystem {
    pub service: OrderService,
    pub broker: Arc<InMemoryBroker>,
    pub repository: Arc<dyn OrderRepository>,
    simulator: MotionSimulator,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl TrackingSystem {
    /// Starts a system backed by an [`InMemoryOrderRepository`].
    pub fn start(
        config: &TrackerConfig,
        resolver: Arc<dyn LocationResolver>,
        planner: Arc<dyn RoutePlanner>,
    ) -> Self {
        let repository: Arc<dyn OrderRepository> = Arc::new(InMemoryOrderRepository::new());
        Self::start_with_repository(config, resolver, planner, repository)
    }

    /// Creates every component, wires them together and spawns the order actor.
    pub fn start_with_repository(
        config: &TrackerConfig,
        resolver: Arc<dyn LocationResolver>,
        planner: Arc<dyn RoutePlanner>,
        repository: Arc<dyn OrderRepository>,
    ) -> Self {
        // 1. Shared pieces
        let registry = SimulationRegistry::new();
        let broker = InMemoryBroker::new(config.broker.subscriber_buffer);

        // 2. Order actor, with the registry injected so stale ticks are rejected
        let (order_actor, order_client) = order_actor::new(ORDER_ACTOR_BUFFER);
        let order_handle = tokio::spawn(order_actor.run(OrderContext {
            repository: repository.clone(),
            simulations: registry.clone(),
        }));

        // 3. Simulator and service on top of the order client
        let dyn_broker: Arc<dyn Broker> = broker.clone();
        let simulator = MotionSimulator::new(
            registry,
            order_client.clone(),
            dyn_broker.clone(),
            SimulationSettings {
                tick_interval: config.simulation.tick_interval(),
                retry: (&config.simulation.retry).into(),
            },
        );
        let service = OrderService::new(ServiceParts {
            orders: order_client,
            repository: repository.clone(),
            resolver,
            planner,
            zone: DeliveryZoneGuard::new(config.delivery.max_radius_meters),
            warehouse: config.warehouse.location(),
            broker: dyn_broker,
            simulator: simulator.clone(),
        });

        info!(
            warehouse = %config.warehouse.label,
            max_radius_meters = config.delivery.max_radius_meters,
            tick_ms = config.simulation.tick_interval_ms,
            "Tracking system started"
        );

        Self {
            service,
            broker,
            repository,
            simulator,
            handles: vec![order_handle],
        }
    }

    pub fn simulator(&self) -> &MotionSimulator {
        &self.simulator
    }

    /// Stops every simulation, closes the actor channel and waits for the
    /// actor to finish.
    ///
    /// Clones of the service handed out elsewhere keep the actor channel open;
    /// drop them before calling this.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down tracking system...");
        self.simulator.stop_all().await;

        // Close the actor channel by dropping every client
        drop(self.service);
        drop(self.simulator);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(e.into());
            }
        }

        info!("Tracking system shutdown complete.");
        Ok(())
    }
}
