//! Traits for metrics collection.

use crate::metrics::data::{Component, StatusSnapshot};

/// Source of status-line values.
///
/// Implementations never fail: an unavailable value is rendered as
/// [`crate::UNKNOWN_STR`]. The display loop is generic over this trait so it
/// can be driven by a fake in tests.
pub trait MetricsProvider {
    /// Display string for one component.
    fn component(&self, component: Component) -> String;

    /// Collect a single snapshot of every metric.
    fn collect_snapshot(&self) -> StatusSnapshot;
}
