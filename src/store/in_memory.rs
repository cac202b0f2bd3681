use crate::model::{AgentId, CustomerId, Order, TrackingId};
use crate::store::{OrderRepository, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory order repository.
///
/// Uses `Arc<RwLock<HashMap<TrackingId, Order>>>` so clones share one map.
#[derive(Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<TrackingId, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn collect_where(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders.values().filter(|o| keep(o)).cloned().collect();
        newest_first(&mut matching);
        matching
    }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.tracking_id.cmp(&b.tracking_id))
    });
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        orders.insert(order.tracking_id.clone(), order.clone());
        Ok(())
    }

    async fn find_by_tracking_id(&self, id: &TrackingId) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.get(id).cloned())
    }

    async fn find_by_agent(&self, agent: &AgentId) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .collect_where(|o| o.assigned_agent.as_ref() == Some(agent))
            .await)
    }

    async fn find_by_customer(&self, customer: &CustomerId) -> Result<Vec<Order>, StoreError> {
        Ok(self.collect_where(|o| &o.customer == customer).await)
    }

    async fn all(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.collect_where(|_| true).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Coordinate, Location, OrderStatus, PaymentMethod, PaymentStatus,
    };
    use chrono::{Duration, Utc};

    fn order(id: &str, customer: &str, age_secs: i64) -> Order {
        let here = Location::new(Coordinate::new(31.0, 75.0), "here");
        Order {
            tracking_id: TrackingId::from(id),
            customer: CustomerId::from(customer),
            status: OrderStatus::Ordered,
            origin: here.clone(),
            destination: here.clone(),
            route: vec![here.coordinate],
            distance_meters: 0.0,
            total_duration_secs: 0.0,
            current_location: here,
            assigned_agent: None,
            payment_method: PaymentMethod::CashOnDelivery,
            payment_status: PaymentStatus::Pending,
            history: Vec::new(),
            created_at: Utc::now() - Duration::seconds(age_secs),
            route_cursor: None,
        }
    }

    #[tokio::test]
    async fn test_save_replaces_by_tracking_id() {
        let repo = InMemoryOrderRepository::new();
        let mut first = order("TRK-1", "alice", 0);
        repo.save(&first).await.unwrap();
        first.status = OrderStatus::Packed;
        repo.save(&first).await.unwrap();

        let all = repo.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, OrderStatus::Packed);
    }

    #[tokio::test]
    async fn test_queries_filter_and_sort_newest_first() {
        let repo = InMemoryOrderRepository::new();
        repo.save(&order("TRK-OLD", "alice", 60)).await.unwrap();
        repo.save(&order("TRK-NEW", "alice", 0)).await.unwrap();
        let mut assigned = order("TRK-BOB", "bob", 30);
        assigned.assigned_agent = Some(AgentId::from("agent-7"));
        repo.save(&assigned).await.unwrap();

        let alice = repo.find_by_customer(&CustomerId::from("alice")).await.unwrap();
        let ids: Vec<_> = alice.iter().map(|o| o.tracking_id.as_str()).collect();
        assert_eq!(ids, ["TRK-NEW", "TRK-OLD"]);

        let agent = repo.find_by_agent(&AgentId::from("agent-7")).await.unwrap();
        assert_eq!(agent.len(), 1);
        assert_eq!(agent[0].tracking_id.as_str(), "TRK-BOB");

        let all: Vec<_> = repo.all().await.unwrap().into_iter().map(|o| o.tracking_id).collect();
        assert_eq!(
            all,
            [TrackingId::from("TRK-NEW"), TrackingId::from("TRK-BOB"), TrackingId::from("TRK-OLD")]
        );
    }

    #[tokio::test]
    async fn test_missing_order_is_none() {
        let repo = InMemoryOrderRepository::new();
        assert!(repo
            .find_by_tracking_id(&TrackingId::from("TRK-NOPE"))
            .await
            .unwrap()
            .is_none());
    }
}
