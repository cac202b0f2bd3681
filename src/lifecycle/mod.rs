//! Process wiring: starting and stopping the tracker, and logging setup.

pub mod tracing;
pub mod tracking_system;

pub use tracking_system::*;
