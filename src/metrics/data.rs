//! Data structures for sampled metrics.

use super::gpu::GpuVendor;
use super::ram::MemInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A finished metric in canonical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    /// Whole percent, 0 to 100
    Percent(u32),
    /// Percent shown with one decimal place, 0.0 to 100.0
    PercentTenths(f64),
    /// Whole degrees Celsius
    Celsius(i64),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(value) => write!(f, "{}%", value),
            Self::PercentTenths(value) => write!(f, "{:.1}%", value),
            Self::Celsius(value) => write!(f, "{}°C", value),
        }
    }
}

/// One pass over the GPU metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuReading {
    /// Detected vendor, `None` when no supported GPU was found
    pub vendor: Option<GpuVendor>,
    /// Busy percentage
    pub utilization: Option<MetricValue>,
    /// VRAM usage percentage
    pub memory: Option<MetricValue>,
    /// Core temperature
    pub temperature: Option<MetricValue>,
}

/// A single sample of everything the status line can show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Timestamp when this snapshot was taken (Unix timestamp in milliseconds)
    pub timestamp: u64,
    /// Parsed `/proc/meminfo`, `None` when unreadable
    pub memory: Option<MemInfo>,
    /// GPU 0 readings
    pub gpu: GpuReading,
}

impl StatusSnapshot {
    /// Create an empty snapshot with the current timestamp.
    pub fn new() -> Self {
        Self {
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            memory: None,
            gpu: GpuReading::default(),
        }
    }
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Value producers that can appear in the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    RamPerc,
    RamFree,
    GpuTemp,
    GpuPerc,
    GpuMemPerc,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Component::RamPerc,
        Component::RamFree,
        Component::GpuTemp,
        Component::GpuPerc,
        Component::GpuMemPerc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::RamPerc => "ram_perc",
            Self::RamFree => "ram_free",
            Self::GpuTemp => "gpu_temp",
            Self::GpuPerc => "gpu_perc",
            Self::GpuMemPerc => "gpu_mem_perc",
        }
    }

    /// Short alias accepted on the command line.
    pub fn alias(self) -> &'static str {
        match self {
            Self::RamPerc => "mem",
            Self::RamFree => "free",
            Self::GpuTemp => "temp",
            Self::GpuPerc => "gpu",
            Self::GpuMemPerc => "vram",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Component {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Component::ALL
            .into_iter()
            .find(|c| c.name() == wanted || c.alias() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Component::ALL.iter().map(|c| c.alias()).collect();
                format!("unknown component '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}
