//! Status line configuration.

use super::Module;
use crate::error::{Result, SystemError};
use crate::metrics::gpu::DEFAULT_SYSFS_ROOT;
use crate::metrics::ram::DEFAULT_MEMINFO_PATH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the status line and its sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Delay between samples in milliseconds
    pub interval_ms: u64,
    /// Print one line per sample instead of rewriting the current line
    pub silent: bool,
    /// DRM card index of the GPU to sample
    pub gpu_index: u32,
    /// Where sysfs is mounted
    pub sysfs_root: PathBuf,
    /// Path of the kernel memory report
    pub meminfo_path: PathBuf,
    /// Reuse the first detected GPU vendor instead of probing every sample
    pub cache_vendor: bool,
    /// Modules rendered left to right
    pub modules: Vec<Module>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            interval_ms: crate::DEFAULT_INTERVAL_MS,
            silent: false,
            gpu_index: 0,
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            meminfo_path: PathBuf::from(DEFAULT_MEMINFO_PATH),
            cache_vendor: false,
            modules: super::default_modules(),
        }
    }
}

impl StatusConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampling interval in milliseconds.
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn with_gpu_index(mut self, index: u32) -> Self {
        self.gpu_index = index;
        self
    }

    pub fn with_sysfs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sysfs_root = root.into();
        self
    }

    pub fn with_meminfo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.meminfo_path = path.into();
        self
    }

    pub fn with_vendor_cache(mut self, enabled: bool) -> Self {
        self.cache_vendor = enabled;
        self
    }

    /// Replace the module list.
    pub fn with_modules(mut self, modules: Vec<Module>) -> Self {
        self.modules = modules;
        self
    }

    /// Sampling interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(SystemError::config_error("interval must be greater than zero"));
        }
        if self.modules.is_empty() {
            return Err(SystemError::config_error("at least one module is required"));
        }
        Ok(())
    }
}
