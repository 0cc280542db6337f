//! Logging configuration module for Basemint applications.
//!
//! This module provides initialization and configuration of the application's logging system
//! using the tracing framework. It sets up appropriate log levels for different components
//! and configures the logging output format.

use tracing::Level;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the logging system with predefined configuration. Verbose mode
/// lowers the default level to `DEBUG`.
pub fn init(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::registry()
        .with(
            filter::Targets::new()
                .with_default(default_level)
                .with_target("hyper", Level::WARN)
                .with_target("reqwest", Level::WARN)
                .with_target("ethers_providers", Level::WARN),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
