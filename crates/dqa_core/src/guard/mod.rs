use std::time::{Duration, Instant};

use sysinfo::System;

use crate::error::AppError;

/// Fail fast before starting an ingestion or retrieval pass when available
/// memory has dropped below the configured ratio of total memory.
pub fn ensure_enough_memory(min_free_ratio: f64) -> Result<(), AppError> {
    let mut sys = System::new();
    sys.refresh_memory();
    let total = sys.total_memory();
    let free_ratio = if total == 0 {
        1.0
    } else {
        sys.available_memory() as f64 / total as f64
    };
    if free_ratio < min_free_ratio {
        tracing::warn!(free_ratio, min_free_ratio, "memory guard tripped");
        return Err(AppError::new(
            "RESOURCE_EXHAUSTED",
            "Not enough free memory to continue processing",
        )
        .with_details(format!(
            "free_ratio={free_ratio:.3}; min_free_ratio={min_free_ratio:.3}"
        )));
    }
    Ok(())
}

/// Cooperative wall-clock guard around one pipeline operation.
///
/// The closure runs to completion; if its elapsed time exceeded the ceiling
/// the successful result is discarded and a `RESOURCE_EXHAUSTED` error is
/// reported instead. In-flight work is never preempted.
pub fn run_with_deadline<T>(
    op: &str,
    ceiling: Duration,
    f: impl FnOnce() -> Result<T, AppError>,
) -> Result<T, AppError> {
    let start = Instant::now();
    let result = f()?;
    let elapsed = start.elapsed();
    if elapsed > ceiling {
        tracing::warn!(
            op,
            elapsed_ms = elapsed.as_millis() as u64,
            ceiling_ms = ceiling.as_millis() as u64,
            "operation exceeded processing deadline"
        );
        return Err(AppError::new(
            "RESOURCE_EXHAUSTED",
            "Operation exceeded processing deadline",
        )
        .with_details(format!(
            "op={op}; elapsed_ms={}; ceiling_ms={}",
            elapsed.as_millis(),
            ceiling.as_millis()
        )));
    }
    Ok(result)
}
