//! Tracker configuration loaded from TOML.
//!
//! Every section has defaults, so an empty file is a valid configuration.
//!
//! ```toml
//! [warehouse]
//! lat = 31.28650278795713
//! lng = 75.64906612235929
//!
//! [delivery]
//! max_radius_meters = 3000
//!
//! [simulation]
//! tick_interval_ms = 1000
//!
//! [routing]
//! base_url = "http://router.project-osrm.org"
//! ```

use crate::model::{Coordinate, Location};
use crate::utils::retry::RetryConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const ENV_ROUTING_URL: &str = "ORDER_TRACKER_ROUTING_URL";
pub const ENV_MAX_RADIUS: &str = "ORDER_TRACKER_MAX_RADIUS_METERS";
pub const ENV_TICK_MS: &str = "ORDER_TRACKER_TICK_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    pub lat: f64,
    pub lng: f64,
    pub label: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            lat: 31.28650278795713,
            lng: 75.64906612235929,
            label: "Warehouse (Jalandhar)".into(),
        }
    }
}

impl WarehouseConfig {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    pub fn location(&self) -> Location {
        Location::new(self.coordinate(), self.label.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub max_radius_meters: f64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_radius_meters: 3000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 2000,
            multiplier: 2.0,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        RetryConfig {
            max_attempts: settings.max_attempts,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            multiplier: settings.multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_interval_ms: u64,
    pub retry: RetrySettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            retry: RetrySettings::default(),
        }
    }
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://router.project-osrm.org".into(),
            profile: "driving".into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Events queued per subscriber before new ones are dropped for it.
    pub subscriber_buffer: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: 256,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub warehouse: WarehouseConfig,
    pub delivery: DeliveryConfig,
    pub simulation: SimulationConfig,
    pub routing: RoutingConfig,
    pub broker: BrokerConfig,
    pub logging: LoggingConfig,
}

impl TrackerConfig {
    /// Parses and validates TOML content. Environment overrides are not applied.
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, applies environment overrides and validates the result.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `ORDER_TRACKER_*` overrides using `lookup` to read variables.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(ENV_ROUTING_URL) {
            self.routing.base_url = url;
        }
        if let Some(radius) = lookup(ENV_MAX_RADIUS) {
            self.delivery.max_radius_meters = radius
                .trim()
                .parse()
                .map_err(|_| invalid("max_radius_meters", format!("{ENV_MAX_RADIUS}={radius}")))?;
        }
        if let Some(tick) = lookup(ENV_TICK_MS) {
            self.simulation.tick_interval_ms = tick
                .trim()
                .parse()
                .map_err(|_| invalid("tick_interval_ms", format!("{ENV_TICK_MS}={tick}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.warehouse.coordinate().is_valid() {
            return Err(invalid("warehouse", "coordinates out of range"));
        }
        let radius = self.delivery.max_radius_meters;
        if !(radius.is_finite() && radius > 0.0) {
            return Err(invalid("max_radius_meters", "must be positive"));
        }
        if self.simulation.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms", "must be positive"));
        }
        if self.simulation.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.simulation.retry.multiplier < 1.0 {
            return Err(invalid("retry.multiplier", "must be at least 1.0"));
        }
        if self.broker.subscriber_buffer == 0 {
            return Err(invalid("subscriber_buffer", "must be positive"));
        }
        if self.routing.base_url.is_empty() {
            return Err(invalid("base_url", "must not be empty"));
        }
        Ok(())
    }
}
