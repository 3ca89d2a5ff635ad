//! Logging utilities for mogreps-ingest.
//!
//! This module provides structured logging functionality so that every run
//! leaves a searchable trail of what was selected, derived and written.

use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::dataset::Dataset;
use crate::error::IngestError;

/// Initialize the tracing subscriber with the given log level
///
/// `RUST_LOG` takes precedence over the configured level when it is set.
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    // A second call (tests, the inspection tool) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration = start_time.elapsed();
    let duration_ms = duration.as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation failed"
        );
    }
}

/// Log an operation with timing and result in a single statement
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let span_id = Uuid::new_v4();

    debug!(
        operation = operation,
        span_id = %span_id,
        "Starting operation"
    );

    let result = f();

    info!(
        operation = operation,
        span_id = %span_id,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log a summary of the dataset document about to be written
pub fn log_dataset_stats(dataset: &Dataset, output_key: &str) {
    let bands: Vec<&str> = dataset.image.bands.keys().map(String::as_str).collect();
    info!(
        operation = "make_dataset",
        dataset_id = %dataset.id,
        output_key = output_key,
        band_count = bands.len(),
        bands = %bands.join(", "),
        from_dt = dataset.extent.from_dt.as_deref().unwrap_or("none"),
        to_dt = dataset.extent.to_dt.as_deref().unwrap_or("none"),
        "Dataset document assembled"
    );
}

/// Log an error with context
pub fn log_error(error: &IngestError, context: &str) {
    error!(
        error = %error,
        context = context,
        "Error occurred"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_log_timed_operation() {
        let result = log_timed_operation("test_operation", || {
            std::thread::sleep(Duration::from_millis(1));
            42
        });

        assert_eq!(result, 42);
    }

    #[test]
    fn test_init_tracing_twice_does_not_panic() {
        init_tracing("debug");
        init_tracing("info");
    }
}
