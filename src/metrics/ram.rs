//! System memory from `/proc/meminfo`.

use super::or_unknown;
use crate::error::{Result, SystemError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default location of the kernel memory report.
pub const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";

/// The `/proc/meminfo` fields the status line uses, in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemInfo {
    pub mem_total_kb: u64,
    pub mem_free_kb: u64,
    pub mem_available_kb: u64,
    pub swap_total_kb: u64,
    pub swap_free_kb: u64,
}

impl MemInfo {
    /// Read the live `/proc/meminfo`.
    pub fn read() -> Result<Self> {
        Self::read_from(DEFAULT_MEMINFO_PATH)
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SystemError::io(path, e))?;
        Self::parse(&content)
    }

    /// Parse `Key:   value kB` lines. Unknown keys are ignored; a tracked key
    /// with a non-numeric value is an error, as is a missing `MemTotal`.
    pub fn parse(content: &str) -> Result<Self> {
        let mut info = Self::default();

        for line in content.lines() {
            let Some((key, rest)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            let field = match key {
                "MemTotal" => &mut info.mem_total_kb,
                "MemFree" => &mut info.mem_free_kb,
                "MemAvailable" => &mut info.mem_available_kb,
                "SwapTotal" => &mut info.swap_total_kb,
                "SwapFree" => &mut info.swap_free_kb,
                _ => continue,
            };

            let value = rest.split_whitespace().next().unwrap_or("");
            *field = value
                .parse()
                .map_err(|e| SystemError::parse_error(value, format!("{}: {}", key, e)))?;
        }

        if info.mem_total_kb == 0 {
            return Err(SystemError::parse_error(
                content.lines().next().unwrap_or(""),
                "missing required memory fields",
            ));
        }

        Ok(info)
    }

    /// Share of memory not available to new allocations.
    pub fn usage_percent(&self) -> f64 {
        if self.mem_total_kb == 0 {
            return 0.0;
        }
        self.mem_total_kb.saturating_sub(self.mem_available_kb) as f64
            / self.mem_total_kb as f64
            * 100.0
    }

    /// `MemFree` in GiB.
    pub fn free_gib(&self) -> f64 {
        self.mem_free_kb as f64 / 1024.0 / 1024.0
    }

    /// Fixed-width kB table of every tracked field.
    pub fn render(&self) -> String {
        format!(
            "MemTotal:       {:>7} kB\n\
             MemFree:        {:>7} kB\n\
             MemAvailable:   {:>7} kB\n\
             SwapTotal:      {:>7} kB\n\
             SwapFree:       {:>7} kB",
            self.mem_total_kb,
            self.mem_free_kb,
            self.mem_available_kb,
            self.swap_total_kb,
            self.swap_free_kb,
        )
    }
}

pub fn format_usage(info: &MemInfo) -> String {
    format!("{:.1}%", info.usage_percent())
}

pub fn format_free(info: &MemInfo) -> String {
    format!("{:.1}G", info.free_gib())
}

/// Memory in use, e.g. `"37.5%"`.
pub fn ram_perc() -> String {
    or_unknown(MemInfo::read().map(|info| format_usage(&info)))
}

/// Free memory, e.g. `"3.2G"`.
pub fn ram_free() -> String {
    or_unknown(MemInfo::read().map(|info| format_free(&info)))
}
