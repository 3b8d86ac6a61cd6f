//! Metric readers and the collector that ties them together.
//!
//! Memory comes from `/proc/meminfo`; GPU metrics come from kernel sysfs
//! counters (AMD, Intel) or the `nvidia-smi` tool (NVIDIA).

pub mod collector;
pub mod data;
pub mod gpu;
pub mod ram;
pub mod traits;

// Re-export commonly used items
pub use collector::SystemCollector;
pub use data::{Component, GpuReading, MetricValue, StatusSnapshot};
pub use traits::MetricsProvider;

use crate::error::Result;
use std::fmt::Display;

/// Render `result` for display, mapping every error to [`crate::UNKNOWN_STR`].
pub fn or_unknown<T: Display>(result: Result<T>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(_) => crate::UNKNOWN_STR.to_string(),
    }
}
