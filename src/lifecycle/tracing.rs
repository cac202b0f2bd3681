//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a `tracing-subscriber` fmt subscriber for the
//! whole process.
//!
//! ## Configuration
//!
//! The level comes from `[logging] level`; `RUST_LOG` overrides it when set.
//! `format = "json"` emits one JSON object per line for log shippers. The
//! default is a compact format that hides the module prefix
//! (`with_target(false)`) and shows spans inline.
//!
//! ```bash
//! RUST_LOG=info cargo run -- --code 7JPX+JJ8
//! RUST_LOG=order_tracker::simulation=debug cargo run -- --code 7JPX+JJ8
//! ```
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: startup and shutdown with the final store size
//! - **Entity operations**: every Create, Get, Update and Action, with the tracking id
//! - **Simulation**: start, stop, skipped ticks and completion, inside a
//!   `simulation{tracking_id, run_id}` span
//! - **Broker**: joins, leaves, dropped events and pruned subscribers
//!
//! With `RUST_LOG=info` a delivery reads like:
//!
//! ```text
//! INFO Order placed tracking_id=TRK-3F9A0C12B7DE distance_meters=1840.2
//! INFO Agent assigned tracking_id=TRK-3F9A0C12B7DE agent=agent-7 status=Packed
//! INFO Status changed tracking_id=TRK-3F9A0C12B7DE status=Out for Delivery
//! INFO Simulation started tracking_id=TRK-3F9A0C12B7DE run_id=1 waypoints=42
//! INFO simulation: Route complete delivered=true
//! ```

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

pub fn setup_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .compact()
                .init();
        }
    }
}
