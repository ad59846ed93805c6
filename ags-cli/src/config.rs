//! Configuration module
//!
//! Handles CLI configuration including the GP task URL and polling cadence.

use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the geoprocessing task endpoint
    pub service_url: String,

    /// Delay between status polls when waiting
    pub poll_interval: Duration,

    /// Optional bound on how long to wait for a terminal state
    pub poll_timeout: Option<Duration>,
}
