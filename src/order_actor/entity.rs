//! Entity trait implementation for the Order domain type.
//!
//! Each hook applies one lifecycle rule and persists the result through the
//! repository in [`OrderContext`] before the actor replies. A failed rule or a
//! failed save leaves the stored order untouched.

use super::actions::{OrderAction, OrderActionResult};
use super::{OrderContext, OrderError};
use crate::framework::ActorEntity;
use crate::model::{Order, OrderCreate, OrderStatus, OrderUpdate, TrackingId};
use crate::simulation::RunId;
use async_trait::async_trait;

fn ensure_current_run(ctx: &OrderContext, id: &TrackingId, run_id: RunId) -> Result<(), OrderError> {
    if ctx.simulations.is_current(id, run_id) {
        Ok(())
    } else {
        Err(OrderError::SimulationInactive)
    }
}

#[async_trait]
impl ActorEntity for Order {
    type Id = TrackingId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = OrderContext;
    type Error = OrderError;

    fn from_create_params(id: TrackingId, params: OrderCreate) -> Result<Self, OrderError> {
        Order::place(id, params)
    }

    async fn on_create(&mut self, ctx: &OrderContext) -> Result<(), OrderError> {
        ctx.repository.save(self).await?;
        Ok(())
    }

    async fn on_update(&mut self, update: OrderUpdate, ctx: &OrderContext) -> Result<(), OrderError> {
        if let Some(status) = update.payment_status {
            self.record_payment(status)?;
        }
        ctx.repository.save(self).await?;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &OrderContext,
    ) -> Result<OrderActionResult, OrderError> {
        let result = match action {
            OrderAction::Transition { to, location } => {
                self.transition(to, location)?;
                OrderActionResult::Transition(self.clone())
            }
            OrderAction::Assign { agent } => {
                self.assign(agent)?;
                OrderActionResult::Assign(self.clone())
            }
            OrderAction::Advance { run_id, index } => {
                ensure_current_run(ctx, &self.tracking_id, run_id)?;
                OrderActionResult::Advance(self.advance_to(run_id, index)?)
            }
            OrderAction::CompleteDelivery { run_id } => {
                ensure_current_run(ctx, &self.tracking_id, run_id)?;
                self.complete_delivery()?;
                OrderActionResult::CompleteDelivery(self.clone())
            }
            OrderAction::ReportLocation { location } => {
                let in_transit = matches!(
                    self.status,
                    OrderStatus::Shipped | OrderStatus::OutForDelivery
                );
                if !in_transit || ctx.simulations.is_active(&self.tracking_id) {
                    return Err(OrderError::LocationNotAccepted(self.status));
                }
                self.current_location = location.clone();
                OrderActionResult::ReportLocation(location)
            }
        };
        ctx.repository.save(self).await?;
        Ok(result)
    }
}
