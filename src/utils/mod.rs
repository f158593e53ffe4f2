//! Configuration and logging setup

pub mod config;
pub mod logging;

pub use config::{ConfigError, ConfigResult, LocationConfig};
pub use logging::init_logging;
