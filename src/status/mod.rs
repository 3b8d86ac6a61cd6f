//! Status line templating and the sampling loop.

pub mod config;

pub use config::StatusConfig;

use crate::metrics::{Component, MetricsProvider};
use crate::UNKNOWN_STR;
use futures_util::stream::{self, BoxStream};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// One segment of the status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Value producer
    pub component: Component,
    /// Template; the first `{}` is replaced by the value, otherwise the
    /// value is appended
    pub format: String,
}

impl Module {
    pub fn new(component: Component, format: impl Into<String>) -> Self {
        Self {
            component,
            format: format.into(),
        }
    }

    /// Label-style module for `component`, e.g. `"GPU: {} "`.
    pub fn labelled(component: Component) -> Self {
        let label = match component {
            Component::RamPerc => "Mem",
            Component::RamFree => "Free",
            Component::GpuTemp => "Temp",
            Component::GpuPerc => "GPU",
            Component::GpuMemPerc => "VRAM",
        };
        Self::new(component, format!("{}: {{}} ", label))
    }

    pub fn render(&self, value: &str) -> String {
        let value = if value.is_empty() { UNKNOWN_STR } else { value };
        if self.format.contains("{}") {
            self.format.replacen("{}", value, 1)
        } else {
            format!("{}{}", self.format, value)
        }
    }
}

/// Memory, free memory, GPU temperature, GPU busy and VRAM, in that order.
pub fn default_modules() -> Vec<Module> {
    Component::ALL.into_iter().map(Module::labelled).collect()
}

/// Sample every module once and join the results.
pub fn render_line<P: MetricsProvider + ?Sized>(provider: &P, modules: &[Module]) -> String {
    modules
        .iter()
        .map(|module| module.render(&provider.component(module.component)))
        .collect()
}

/// Stream of rendered lines, one per `interval`; the first is immediate.
///
/// Sampling happens inline on the polling task, so a slow source delays the
/// next line rather than overlapping with it. Must be called from within a
/// Tokio runtime.
pub fn start_stream<P>(
    provider: P,
    modules: Vec<Module>,
    interval: Duration,
) -> BoxStream<'static, String>
where
    P: MetricsProvider + Send + 'static,
{
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let stream = stream::unfold(
        (provider, modules, ticker),
        |(provider, modules, mut ticker)| async move {
            ticker.tick().await;
            let line = render_line(&provider, &modules);
            Some((line, (provider, modules, ticker)))
        },
    );

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::StatusSnapshot;
    use futures_util::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed;

    impl MetricsProvider for Fixed {
        fn component(&self, component: Component) -> String {
            match component {
                Component::RamPerc => "37.5%".into(),
                Component::RamFree => "3.2G".into(),
                Component::GpuTemp => "65°C".into(),
                Component::GpuPerc => String::new(),
                Component::GpuMemPerc => UNKNOWN_STR.into(),
            }
        }

        fn collect_snapshot(&self) -> StatusSnapshot {
            StatusSnapshot::new()
        }
    }

    struct Counting(AtomicUsize);

    impl MetricsProvider for Counting {
        fn component(&self, _component: Component) -> String {
            (self.0.fetch_add(1, Ordering::SeqCst) + 1).to_string()
        }

        fn collect_snapshot(&self) -> StatusSnapshot {
            StatusSnapshot::new()
        }
    }

    #[test]
    fn test_default_line() {
        let line = render_line(&Fixed, &default_modules());
        assert_eq!(
            line,
            "Mem: 37.5% Free: 3.2G Temp: 65°C GPU: n/a VRAM: n/a "
        );
    }

    #[test]
    fn test_module_render() {
        assert_eq!(Module::new(Component::GpuPerc, "[{}]").render("5%"), "[5%]");
        assert_eq!(Module::new(Component::GpuPerc, "gpu ").render("5%"), "gpu 5%");
        assert_eq!(Module::new(Component::GpuPerc, "{} {}").render("5%"), "5% {}");
        assert_eq!(Module::labelled(Component::GpuMemPerc).render(""), "VRAM: n/a ");
    }

    #[tokio::test]
    async fn test_stream_samples_each_tick() {
        let modules = vec![Module::new(Component::GpuPerc, "{}")];
        let stream = start_stream(Counting(AtomicUsize::new(0)), modules, Duration::from_millis(5));

        let lines: Vec<String> = stream.take(3).collect().await;
        assert_eq!(lines, vec!["1", "2", "3"]);
    }
}
