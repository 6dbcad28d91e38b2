//! Dispatch metrics for Halyard.
//!
//! Metrics go through the `metrics` facade. No exporter is installed here:
//! the hosting binary installs whatever recorder suits its platform, and
//! without one every call below is a no-op.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `halyard_dispatch_total` | Counter | `method`, `status` | Dispatched events |
//! | `halyard_dispatch_errors_total` | Counter | `kind` | Dispatches that ended in an error |
//! | `halyard_dispatch_duration_seconds` | Histogram | `method` | Dispatch latency |
//! | `halyard_cold_starts_total` | Counter | - | First invocations in a process |

use std::sync::Once;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Counter of dispatched events.
pub const DISPATCH_TOTAL: &str = "halyard_dispatch_total";
/// Counter of failed dispatches.
pub const DISPATCH_ERRORS_TOTAL: &str = "halyard_dispatch_errors_total";
/// Histogram of dispatch latency.
pub const DISPATCH_DURATION_SECONDS: &str = "halyard_dispatch_duration_seconds";
/// Counter of cold starts.
pub const COLD_STARTS_TOTAL: &str = "halyard_cold_starts_total";

static DESCRIBE: Once = Once::new();

/// Registers descriptions for all standard metrics.
///
/// Safe to call more than once; only the first call registers.
pub fn describe_metrics() {
    DESCRIBE.call_once(|| {
        describe_counter!(DISPATCH_TOTAL, "Total number of dispatched events");
        describe_counter!(
            DISPATCH_ERRORS_TOTAL,
            "Total number of dispatches that ended in an error, by kind"
        );
        describe_histogram!(
            DISPATCH_DURATION_SECONDS,
            metrics::Unit::Seconds,
            "Event dispatch duration in seconds"
        );
        describe_counter!(COLD_STARTS_TOTAL, "Total number of cold starts");
    });
}

/// Records a completed dispatch.
///
/// Updates `halyard_dispatch_total` and `halyard_dispatch_duration_seconds`.
pub fn record_dispatch(method: &str, status_code: u16, duration: Duration) {
    counter!(
        DISPATCH_TOTAL,
        "method" => method.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(DISPATCH_DURATION_SECONDS, "method" => method.to_string())
        .record(duration.as_secs_f64());
}

/// Records a dispatch that ended in an error.
///
/// `kind` is the error's machine-readable code, e.g. `"NOT_FOUND"`.
pub fn record_dispatch_error(kind: &str) {
    counter!(DISPATCH_ERRORS_TOTAL, "kind" => kind.to_string()).increment(1);
}

/// Records a cold start.
pub fn record_cold_start() {
    counter!(COLD_STARTS_TOTAL).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert_eq!(DISPATCH_TOTAL, "halyard_dispatch_total");
        assert_eq!(DISPATCH_ERRORS_TOTAL, "halyard_dispatch_errors_total");
        assert_eq!(
            DISPATCH_DURATION_SECONDS,
            "halyard_dispatch_duration_seconds"
        );
    }

    #[test]
    fn test_record_functions_dont_panic() {
        // No recorder is installed in tests; the facade discards everything.
        describe_metrics();
        describe_metrics();
        record_dispatch("GET", 200, Duration::from_millis(10));
        record_dispatch_error("not_found");
        record_cold_start();
    }
}
