//! # Keystone Telemetry
//!
//! Logging bootstrap for processes hosting Keystone modules. The kernel
//! crates only emit `tracing` events; this crate is where a host decides
//! what those events look like and where they go.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keystone_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("failed to init telemetry");
//!
//!     // Managers constructed after this point log through the subscriber.
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `KEYSTONE_SERVICE_NAME` | `keystone` | Service name in log lines |
//! | `KEYSTONE_LOG_LEVEL` | `info` | Log level filter |
//! | `KEYSTONE_CONSOLE_OUTPUT` | `true` | Human-readable console layer |
//! | `KEYSTONE_JSON_LOGS` | auto | JSON layer; defaults on in containers |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    Install(String),
}

/// Initialize logging and return a guard that marks shutdown when dropped.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Guard that keeps telemetry notionally active. Drop it last.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "shutting down telemetry");
    }
}
