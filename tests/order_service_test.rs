mod common;

use common::{drain, shipped_order, start_system, FixedRoutePlanner, FlakyRepository, NEARBY_CODE};
use order_tracker::broker::{Broker, Topic, TrackingEvent};
use order_tracker::geo::GeoError;
use order_tracker::model::{
    AgentId, Coordinate, CustomerId, Location, OrderStatus, PaymentMethod, PaymentStatus, TrackingId,
};
use order_tracker::order_actor::OrderError;
use order_tracker::service::ServiceError;
use std::sync::atomic::Ordering;

fn cash(customer: &str) -> (CustomerId, &'static str, PaymentMethod) {
    (CustomerId::from(customer), NEARBY_CODE, PaymentMethod::CashOnDelivery)
}

#[tokio::test]
async fn test_create_places_order_at_the_warehouse() {
    let planner = FixedRoutePlanner::new(6, 1200.0);
    let system = start_system(planner.clone(), FlakyRepository::new());
    let mut admin = system.broker.subscribe_to([Topic::Admin]);

    let (customer, code, method) = cash("alice");
    let order = system.service.create(customer, code, method).await.unwrap();

    assert_eq!(order.status, OrderStatus::Ordered);
    assert_eq!(order.history.len(), 1);
    assert_eq!(order.route.len(), 6);
    assert_eq!(order.distance_meters, 1200.0);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.destination.label.as_deref(), Some("Plus Code: 7JPX+JJ8"));
    assert_eq!(order.current_location, *system.service.warehouse());
    assert!(order.tracking_id.as_str().starts_with("TRK-"));
    assert_eq!(planner.calls.load(Ordering::SeqCst), 1);

    let events = drain(&mut admin);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0].event.as_ref(),
        TrackingEvent::OrderCreated { order: created } if created.tracking_id == order.tracking_id
    ));

    let stored = system.service.get(order.tracking_id.clone()).await.unwrap();
    assert_eq!(stored.tracking_id, order.tracking_id);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_route_at_the_radius_is_accepted() {
    let system = start_system(FixedRoutePlanner::new(3, 3000.0), FlakyRepository::new());
    let (customer, code, method) = cash("alice");
    assert!(system.service.create(customer, code, method).await.is_ok());
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_route_beyond_the_radius_is_rejected() {
    let system = start_system(FixedRoutePlanner::new(3, 3001.0), FlakyRepository::new());
    let mut admin = system.broker.subscribe_to([Topic::Admin]);

    let (customer, code, method) = cash("alice");
    let err = system.service.create(customer, code, method).await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::OutOfDeliveryZone {
            distance_meters: 3001.0,
            max_radius_meters: 3000.0
        }
    );
    assert!(system.service.all_orders().await.unwrap().is_empty());
    assert!(drain(&mut admin).is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_code_is_rejected_before_routing() {
    let planner = FixedRoutePlanner::new(3, 800.0);
    let system = start_system(planner.clone(), FlakyRepository::new());

    let err = system
        .service
        .create(CustomerId::from("alice"), "not-a-code", PaymentMethod::CashOnDelivery)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Geo(GeoError::InvalidLocationCode(_))));
    assert_eq!(planner.calls.load(Ordering::SeqCst), 0);
    assert!(system.service.all_orders().await.unwrap().is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_routing_failure_creates_nothing() {
    let system = start_system(FixedRoutePlanner::failing(), FlakyRepository::new());
    let (customer, code, method) = cash("alice");
    let err = system.service.create(customer, code, method).await.unwrap_err();
    assert!(matches!(err, ServiceError::Geo(GeoError::RouteUnavailable(_))));
    assert!(system.service.all_orders().await.unwrap().is_empty());
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_store_failure_on_create_leaves_no_order() {
    let repository = FlakyRepository::new();
    let system = start_system(FixedRoutePlanner::new(3, 800.0), repository.clone());
    let mut admin = system.broker.subscribe_to([Topic::Admin]);
    repository.fail_next_saves(1);

    let (customer, code, method) = cash("alice");
    let err = system.service.create(customer, code, method).await.unwrap_err();
    assert!(matches!(err, ServiceError::Order(OrderError::Store(_))));
    assert!(system.service.all_orders().await.unwrap().is_empty());
    assert!(drain(&mut admin).is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_assign_packs_and_notifies_every_audience() {
    let system = start_system(FixedRoutePlanner::new(3, 800.0), FlakyRepository::new());
    let (customer, code, method) = cash("alice");
    let order = system.service.create(customer, code, method).await.unwrap();
    let id = order.tracking_id.clone();

    let mut viewer = system.broker.subscribe_to([Topic::Order(id.clone())]);
    let mut admin = system.broker.subscribe_to([Topic::Admin]);
    let mut agent = system.broker.subscribe_to([Topic::Agent(AgentId::from("agent-1"))]);
    let mut other_agent = system.broker.subscribe_to([Topic::Agent(AgentId::from("agent-2"))]);

    let assigned = system.service.assign(id.clone(), AgentId::from("agent-1")).await.unwrap();
    assert_eq!(assigned.status, OrderStatus::Packed);
    assert_eq!(assigned.assigned_agent, Some(AgentId::from("agent-1")));
    assert_eq!(assigned.history.len(), 2);

    assert_eq!(drain(&mut viewer).len(), 1);
    assert_eq!(drain(&mut admin).len(), 1);
    let agent_events = drain(&mut agent);
    assert_eq!(agent_events.len(), 1);
    assert!(matches!(
        agent_events[0].event.as_ref(),
        TrackingEvent::AgentAssigned { tracking_id, .. } if *tracking_id == id
    ));
    assert!(drain(&mut other_agent).is_empty());

    // reassigning while packed keeps the status and history
    let reassigned = system.service.assign(id.clone(), AgentId::from("agent-2")).await.unwrap();
    assert_eq!(reassigned.status, OrderStatus::Packed);
    assert_eq!(reassigned.history.len(), 2);
    assert_eq!(drain(&mut other_agent).len(), 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_assign_after_shipping_is_rejected() {
    let system = start_system(FixedRoutePlanner::new(3, 800.0), FlakyRepository::new());
    let order = shipped_order(&system.service).await;

    let err = system
        .service
        .assign(order.tracking_id.clone(), AgentId::from("agent-2"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Order(OrderError::AssignmentNotAllowed {
            status: OrderStatus::Shipped,
            ..
        })
    ));
    let stored = system.service.get(order.tracking_id).await.unwrap();
    assert_eq!(stored.assigned_agent, Some(AgentId::from("agent-1")));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_online_orders_wait_for_payment() {
    let system = start_system(FixedRoutePlanner::new(3, 800.0), FlakyRepository::new());
    let order = system
        .service
        .create(CustomerId::from("bob"), NEARBY_CODE, PaymentMethod::Online)
        .await
        .unwrap();
    let id = order.tracking_id.clone();

    let err = system.service.assign(id.clone(), AgentId::from("agent-1")).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Order(OrderError::AssignmentNotAllowed {
            status: OrderStatus::Ordered,
            ..
        })
    ));

    let paid = system.service.record_payment(id.clone(), PaymentStatus::Paid).await.unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert_eq!(paid.history.len(), 1);

    let assigned = system.service.assign(id, AgentId::from("agent-1")).await.unwrap();
    assert_eq!(assigned.status, OrderStatus::Packed);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_cancel_only_before_shipping() {
    let system = start_system(FixedRoutePlanner::new(3, 800.0), FlakyRepository::new());

    let (customer, code, method) = cash("alice");
    let packed = system.service.create(customer, code, method).await.unwrap();
    system
        .service
        .assign(packed.tracking_id.clone(), AgentId::from("agent-1"))
        .await
        .unwrap();
    let cancelled = system.service.cancel(packed.tracking_id.clone()).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(cancelled.is_terminal());

    let shipped = shipped_order(&system.service).await;
    let err = system.service.cancel(shipped.tracking_id.clone()).await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::Order(OrderError::IllegalTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Cancelled
        })
    );
    let stored = system.service.get(shipped.tracking_id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Shipped);
    assert_eq!(stored.history.len(), 3);

    // terminal orders reject payment updates
    let err = system
        .service
        .record_payment(packed.tracking_id, PaymentStatus::Paid)
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::Order(OrderError::Closed(OrderStatus::Cancelled)));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_status_cannot_skip_steps() {
    let system = start_system(FixedRoutePlanner::new(3, 800.0), FlakyRepository::new());
    let (customer, code, method) = cash("alice");
    let order = system.service.create(customer, code, method).await.unwrap();

    let err = system
        .service
        .change_status(order.tracking_id.clone(), OrderStatus::Shipped, None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ServiceError::Order(OrderError::IllegalTransition {
            from: OrderStatus::Ordered,
            to: OrderStatus::Shipped
        })
    );
    assert_eq!(system.simulator().active_count(), 0);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_agent_location_reports() {
    let system = start_system(FixedRoutePlanner::new(3, 800.0), FlakyRepository::new());
    let (customer, code, method) = cash("alice");
    let order = system.service.create(customer, code, method).await.unwrap();
    let id = order.tracking_id.clone();
    let here = Location::new(Coordinate::new(31.287, 75.650), "Main Road");

    let err = system.service.report_location(id.clone(), here.clone()).await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::Order(OrderError::LocationNotAccepted(OrderStatus::Ordered))
    );

    system.service.assign(id.clone(), AgentId::from("agent-1")).await.unwrap();
    system
        .service
        .change_status(id.clone(), OrderStatus::Shipped, None)
        .await
        .unwrap();

    let mut viewer = system.broker.subscribe_to([Topic::Order(id.clone())]);
    let reported = system.service.report_location(id.clone(), here.clone()).await.unwrap();
    assert_eq!(reported, here);

    let events = drain(&mut viewer);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0].event.as_ref(),
        TrackingEvent::LocationUpdated { label: Some(label), .. } if label == "Main Road"
    ));
    let stored = system.service.get(id).await.unwrap();
    assert_eq!(stored.current_location, here);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_queries_filter_and_sort_newest_first() {
    let system = start_system(FixedRoutePlanner::new(3, 800.0), FlakyRepository::new());
    let service = &system.service;

    let mut alice_ids = Vec::new();
    for _ in 0..3 {
        let (customer, code, method) = cash("alice");
        alice_ids.push(service.create(customer, code, method).await.unwrap().tracking_id);
    }
    let (customer, code, method) = cash("bob");
    let bob = service.create(customer, code, method).await.unwrap();
    service
        .assign(bob.tracking_id.clone(), AgentId::from("agent-9"))
        .await
        .unwrap();

    let alice = service.orders_for_customer(&CustomerId::from("alice")).await.unwrap();
    assert_eq!(alice.len(), 3);
    assert!(alice.iter().all(|o| alice_ids.contains(&o.tracking_id)));
    assert!(alice.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let agent = service.orders_for_agent(&AgentId::from("agent-9")).await.unwrap();
    assert_eq!(agent.len(), 1);
    assert_eq!(agent[0].tracking_id, bob.tracking_id);

    let all = service.all_orders().await.unwrap();
    assert_eq!(all.len(), 4);
    assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    assert!(service
        .orders_for_customer(&CustomerId::from("carol"))
        .await
        .unwrap()
        .is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let system = start_system(FixedRoutePlanner::new(3, 800.0), FlakyRepository::new());
    let missing = TrackingId::from("TRK-000000000000");

    assert_eq!(
        system.service.get(missing.clone()).await.unwrap_err(),
        ServiceError::Order(OrderError::NotFound(missing.clone()))
    );
    assert_eq!(
        system
            .service
            .change_status(missing.clone(), OrderStatus::Packed, None)
            .await
            .unwrap_err(),
        ServiceError::Order(OrderError::NotFound(missing))
    );

    system.shutdown().await.unwrap();
}
