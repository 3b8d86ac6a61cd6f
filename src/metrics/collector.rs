//! Core metrics collection implementation.

use crate::error::Result;
use crate::metrics::{
    data::{Component, StatusSnapshot},
    gpu::{CommandRunner, GpuSampler, Sysfs, SystemRunner},
    ram::{self, MemInfo, DEFAULT_MEMINFO_PATH},
    traits::MetricsProvider,
};
use crate::status::StatusConfig;
use crate::UNKNOWN_STR;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Metrics collector reading `/proc/meminfo` and GPU 0.
pub struct SystemCollector<R = SystemRunner> {
    meminfo_path: PathBuf,
    gpu: GpuSampler<R>,
}

impl SystemCollector<SystemRunner> {
    /// Create a collector for the live system.
    pub fn new() -> Self {
        Self::with_parts(DEFAULT_MEMINFO_PATH, GpuSampler::new())
    }

    /// Create a collector honouring the paths and GPU settings of `config`.
    pub fn from_config(config: &StatusConfig) -> Self {
        let gpu = GpuSampler::with_runner(Sysfs::new(&config.sysfs_root), SystemRunner)
            .with_index(config.gpu_index)
            .with_vendor_cache(config.cache_vendor);
        Self::with_parts(&config.meminfo_path, gpu)
    }
}

impl Default for SystemCollector<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> SystemCollector<R> {
    pub fn with_parts(meminfo_path: impl Into<PathBuf>, gpu: GpuSampler<R>) -> Self {
        Self {
            meminfo_path: meminfo_path.into(),
            gpu,
        }
    }

    pub fn meminfo_path(&self) -> &Path {
        &self.meminfo_path
    }

    pub fn gpu(&self) -> &GpuSampler<R> {
        &self.gpu
    }

    /// Read memory information.
    pub fn memory(&self) -> Result<MemInfo> {
        MemInfo::read_from(&self.meminfo_path)
    }

    /// Produce one component value, keeping the failure reason.
    pub fn produce(&self, component: Component) -> Result<String> {
        match component {
            Component::RamPerc => self.memory().map(|info| ram::format_usage(&info)),
            Component::RamFree => self.memory().map(|info| ram::format_free(&info)),
            Component::GpuTemp => self.gpu.temperature().map(|v| v.to_string()),
            Component::GpuPerc => self.gpu.utilization().map(|v| v.to_string()),
            Component::GpuMemPerc => self.gpu.memory().map(|v| v.to_string()),
        }
    }
}

impl<R: CommandRunner> MetricsProvider for SystemCollector<R> {
    fn component(&self, component: Component) -> String {
        match self.produce(component) {
            Ok(value) if !value.is_empty() => value,
            Ok(_) => UNKNOWN_STR.to_string(),
            Err(err) => {
                debug!(%component, kind = ?err.kind(), "component unavailable: {}", err);
                UNKNOWN_STR.to_string()
            }
        }
    }

    fn collect_snapshot(&self) -> StatusSnapshot {
        let mut snapshot = StatusSnapshot::new();

        snapshot.memory = match self.memory() {
            Ok(info) => Some(info),
            Err(err) => {
                debug!(kind = ?err.kind(), "memory unavailable: {}", err);
                None
            }
        };
        snapshot.gpu = self.gpu.sample();

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::gpu::testing::{FakeSmi, SysfsFixture};
    use crate::metrics::gpu::GpuVendor;
    use std::fs;
    use tempfile::TempDir;

    const MEMINFO: &str = "MemTotal: 8000 kB\nMemFree: 2097152 kB\nMemAvailable: 6000 kB\n";

    fn collector(fixture: &SysfsFixture, meminfo: &Path, smi: FakeSmi) -> SystemCollector<FakeSmi> {
        SystemCollector::with_parts(meminfo, GpuSampler::with_runner(fixture.sysfs(), smi))
    }

    #[test]
    fn test_components_from_fake_system() {
        let tmp = TempDir::new().unwrap();
        let meminfo = tmp.path().join("meminfo");
        fs::write(&meminfo, MEMINFO).unwrap();

        let fixture = SysfsFixture::new();
        fixture.card_file("gpu_busy_percent", "42");
        fixture.card_file("mem_info_vram_total", "8000000000");
        fixture.card_file("mem_info_vram_used", "4000000000");
        fixture.card_file("hwmon/hwmon0/temp1_input", "65000");

        let collector = collector(&fixture, &meminfo, FakeSmi::missing());
        assert_eq!(collector.component(Component::RamPerc), "25.0%");
        assert_eq!(collector.component(Component::RamFree), "2.0G");
        assert_eq!(collector.component(Component::GpuPerc), "42%");
        assert_eq!(collector.component(Component::GpuMemPerc), "50.0%");
        assert_eq!(collector.component(Component::GpuTemp), "65°C");
    }

    #[test]
    fn test_failures_render_unknown() {
        let tmp = TempDir::new().unwrap();
        let fixture = SysfsFixture::new();
        let collector = collector(&fixture, &tmp.path().join("missing"), FakeSmi::missing());

        for component in Component::ALL {
            assert_eq!(collector.component(component), UNKNOWN_STR);
        }
    }

    #[test]
    fn test_snapshot() {
        let tmp = TempDir::new().unwrap();
        let meminfo = tmp.path().join("meminfo");
        fs::write(&meminfo, MEMINFO).unwrap();

        let fixture = SysfsFixture::new();
        let collector = collector(&fixture, &meminfo, FakeSmi::replying("1024, 4096"));
        let snapshot = collector.collect_snapshot();

        assert!(snapshot.timestamp > 0);
        assert_eq!(snapshot.memory.unwrap().mem_total_kb, 8000);
        assert_eq!(snapshot.gpu.vendor, Some(GpuVendor::Nvidia));
        assert_eq!(snapshot.gpu.memory.unwrap().to_string(), "25.0%");
    }
}
