//! # Motion Simulator
//!
//! One timer-driven task per order that is out for delivery. Each tick moves
//! the order to the next waypoint of its route through the order actor and
//! publishes the new position to `order:<id>` and `admin`. After the last
//! waypoint the task delivers the order, deregisters itself and publishes
//! the delivered order.
//!
//! Tick failures that are transient are retried with backoff. A tick whose
//! retries run out is skipped and the cursor moves on. Any other failure ends
//! the run.

pub mod registry;

pub use registry::{ActiveRun, RunId, SimulationRegistry};

use crate::broker::{Broker, Topic, TrackingEvent};
use crate::clients::{ActorClient, OrderClient};
use crate::model::{Order, TrackingId};
use crate::utils::retry::{retry_on_transient, RetryConfig, RetryResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn, Instrument};

/// Timing for simulation runs.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    pub tick_interval: Duration,
    pub retry: RetryConfig,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Clone)]
pub struct MotionSimulator {
    registry: SimulationRegistry,
    orders: OrderClient,
    broker: Arc<dyn Broker>,
    settings: SimulationSettings,
}

impl MotionSimulator {
    /// `registry` must be the one given to the order actor's context.
    pub fn new(
        registry: SimulationRegistry,
        orders: OrderClient,
        broker: Arc<dyn Broker>,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            registry,
            orders,
            broker,
            settings,
        }
    }

    /// Starts walking `order`'s route. A no-op returning `false` if a run is
    /// already registered for the order or the route is empty.
    pub fn start(&self, order: &Order) -> bool {
        let id = order.tracking_id.clone();
        let waypoints = order.route.len();
        if waypoints == 0 {
            warn!(tracking_id = %id, "Route is empty, simulation not started");
            return false;
        }
        let started = self.registry.start_with(&id, |run_id| {
            let span = tracing::info_span!("simulation", tracking_id = %id, run_id);
            tokio::spawn(self.clone().drive(id.clone(), run_id, waypoints).instrument(span))
        });
        match started {
            Some(run_id) => {
                info!(tracking_id = %id, run_id, waypoints, "Simulation started");
                true
            }
            None => {
                debug!(tracking_id = %id, "Simulation already running");
                false
            }
        }
    }

    /// Cancels the run for `id`, if any. Once this returns, no tick or
    /// completion of that run will be applied or published.
    pub async fn stop(&self, id: &TrackingId) -> bool {
        let Some(run) = self.registry.take(id) else {
            return false;
        };
        run.handle.abort();
        if let Err(e) = run.handle.await {
            if e.is_panic() {
                warn!(tracking_id = %id, run_id = run.run_id, "Simulation task panicked");
            }
        }
        // barrier: a tick already queued in the actor is processed (and
        // rejected, since the run is deregistered) before we return
        let _ = self.orders.get(id.clone()).await;
        info!(tracking_id = %id, run_id = run.run_id, "Simulation stopped");
        true
    }

    /// Stops every run. Used on shutdown.
    pub async fn stop_all(&self) {
        let runs = self.registry.drain();
        let count = runs.len();
        for (_, run) in &runs {
            run.handle.abort();
        }
        for (_, run) in runs {
            let _ = run.handle.await;
        }
        if count > 0 {
            info!(count, "Stopped all simulations");
        }
    }

    pub fn is_active(&self, id: &TrackingId) -> bool {
        self.registry.is_active(id)
    }

    pub fn active_count(&self) -> usize {
        self.registry.len()
    }

    async fn drive(self, id: TrackingId, run_id: RunId, waypoints: usize) {
        for index in 0..waypoints {
            tokio::time::sleep(self.settings.tick_interval).await;

            let outcome = retry_on_transient(&self.settings.retry, |_| {
                let orders = self.orders.clone();
                let id = id.clone();
                async move { orders.advance(id, run_id, index).await }
            })
            .await;

            match outcome {
                RetryResult::Success(location) => {
                    let event = TrackingEvent::location(id.clone(), &location);
                    self.broker.publish(&Topic::Order(id.clone()), event.clone());
                    self.broker.publish(&Topic::Admin, event);
                }
                RetryResult::Failed(error) => {
                    warn!(index, error = %error, "Tick skipped after retries");
                }
                RetryResult::PermanentFailure(error) => {
                    warn!(index, error = %error, "Simulation ended early");
                    self.registry.finish(&id, run_id);
                    return;
                }
            }
        }

        let outcome = retry_on_transient(&self.settings.retry, |_| {
            let orders = self.orders.clone();
            let id = id.clone();
            async move { orders.complete_delivery(id, run_id).await }
        })
        .await;
        self.registry.finish(&id, run_id);

        match outcome {
            RetryResult::Success(order) => {
                info!(delivered = true, "Route complete");
                let event = TrackingEvent::OrderUpdated { order };
                self.broker.publish(&Topic::Order(id.clone()), event.clone());
                self.broker.publish(&Topic::Admin, event);
            }
            RetryResult::Failed(error) | RetryResult::PermanentFailure(error) => {
                warn!(delivered = false, error = %error, "Could not complete delivery");
            }
        }
    }
}
