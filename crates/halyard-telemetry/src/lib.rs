//! Observability for Halyard functions.
//!
//! - **Logging**: structured JSON (or pretty) logs via `tracing-subscriber`
//! - **Tracing**: one subsegment per handler invocation via [`TracedHandler`]
//! - **Metrics**: dispatch counters and latency via the `metrics` facade
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  halyard-telemetry                   │
//! │                                                      │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────┐  │
//! │  │   Logging   │  │ TracedHandler│  │   Metrics   │  │
//! │  │ (EnvFilter) │  │   + Tracer   │  │  (facade)   │  │
//! │  └──────┬──────┘  └──────┬───────┘  └──────┬──────┘  │
//! └─────────┼────────────────┼─────────────────┼─────────┘
//!           ▼                ▼                 ▼
//!     ┌──────────┐    ┌────────────┐    ┌────────────┐
//!     │  stdout  │    │   spans    │    │  host's    │
//!     │  (JSON)  │    │ (SpanTracer│    │  recorder  │
//!     └──────────┘    └────────────┘    └────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use halyard_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::for_service("orders").with_environment("production");
//!
//! init_telemetry(&config)?;
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod instrument;
pub mod logging;
pub mod metrics;
pub mod tracer;

pub use config::{TelemetryConfig, TraceConfig};
pub use error::TelemetryError;
pub use instrument::{ColdStart, TracedHandler, COLD_START_ANNOTATION};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use tracer::{SpanSubsegment, SpanTracer, Subsegment, Tracer};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging and registers metric descriptions.
///
/// # Errors
///
/// Returns `TelemetryError` if the logging subscriber cannot be installed.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    metrics::describe_metrics();

    tracing::info!(
        service = %config.service_name(),
        environment = %config.environment,
        trace = config.tracing.trace,
        "Telemetry initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_with_logging_disabled() {
        let config = TelemetryConfig::for_service("orders").with_logging(LogConfig {
            enabled: false,
            ..LogConfig::default()
        });
        assert!(init_telemetry(&config).is_ok());
    }
}
