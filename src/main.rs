//! Demo: places one order, walks it to `OutForDelivery` and prints every
//! tracking event as JSON until it is delivered.

use clap::Parser;
use order_tracker::broker::{Broker, Topic, TrackingEvent};
use order_tracker::config::TrackerConfig;
use order_tracker::geo::{OsrmRoutePlanner, PlusCodeResolver};
use order_tracker::lifecycle::tracing::setup_tracing;
use order_tracker::lifecycle::TrackingSystem;
use order_tracker::model::{AgentId, CustomerId, OrderStatus, PaymentMethod, PaymentStatus};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[derive(Debug, Parser)]
#[command(name = "order-tracker", about = "Place and track a simulated delivery")]
struct Args {
    /// TOML configuration file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Destination plus code, full or short (relative to the warehouse)
    #[arg(long, default_value = "7JPX+JJ8")]
    code: String,

    #[arg(long, default_value = "customer-1")]
    customer: String,

    #[arg(long, default_value = "agent-1")]
    agent: String,

    /// Pay online instead of cash on delivery
    #[arg(long)]
    online: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TrackerConfig::load(path)?,
        None => {
            let mut config = TrackerConfig::default();
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config.validate()?;
            config
        }
    };
    setup_tracing(&config.logging);

    let system = TrackingSystem::start(
        &config,
        Arc::new(PlusCodeResolver::new()),
        Arc::new(OsrmRoutePlanner::from_config(&config.routing)),
    );

    let result = run(&system, &args).await;
    if let Err(e) = &result {
        error!(error = %e, "Demo failed");
    }
    system.shutdown().await?;
    result
}

async fn run(system: &TrackingSystem, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let service = &system.service;
    let payment = if args.online {
        PaymentMethod::Online
    } else {
        PaymentMethod::CashOnDelivery
    };

    let span = tracing::info_span!("order_placement");
    let order = service
        .create(CustomerId(args.customer.clone()), &args.code, payment)
        .instrument(span)
        .await?;
    info!(
        tracking_id = %order.tracking_id,
        distance_km = order.distance_meters / 1000.0,
        waypoints = order.route.len(),
        "Order created"
    );

    let id = order.tracking_id.clone();
    let mut viewer = system
        .broker
        .subscribe_to([Topic::Order(id.clone()), Topic::Agent(AgentId(args.agent.clone()))]);

    if args.online {
        service.record_payment(id.clone(), PaymentStatus::Paid).await?;
    }
    service.assign(id.clone(), AgentId(args.agent.clone())).await?;
    service.change_status(id.clone(), OrderStatus::Shipped, None).await?;
    service
        .change_status(id.clone(), OrderStatus::OutForDelivery, None)
        .await?;

    while let Some(envelope) = viewer.recv().await {
        println!("{}", envelope.to_json()?);
        if let TrackingEvent::OrderUpdated { order } = envelope.event.as_ref() {
            if order.status == OrderStatus::Delivered {
                break;
            }
        }
    }

    let delivered = service.get(id).await?;
    info!(history = delivered.history.len(), "Delivery complete");
    Ok(())
}
