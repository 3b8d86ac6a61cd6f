//! Kernel-exposed GPU counters under `/sys/class/drm`.
//!
//! Every counter is a tiny text file holding one base-10 integer. Hardware
//! monitor directories are enumerated by the kernel with unstable numeric
//! suffixes (`hwmon0`, `hwmon3`, ...), so the directory is scanned and the
//! first lexicographic `hwmon*` entry holding the wanted file wins.

use crate::error::{Result, SystemError};
use std::fs;
use std::path::{Path, PathBuf};

/// Default mount point of sysfs.
pub const DEFAULT_SYSFS_ROOT: &str = "/sys";

/// Name prefix of the kernel's hardware monitor directories.
pub const HWMON_PREFIX: &str = "hwmon";

/// Bytes per MiB, used by the Intel VRAM conversion.
pub const BYTES_PER_MIB: i64 = 1024 * 1024;

/// A sysfs tree, rooted at `/sys` in production and at a scratch
/// directory in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sysfs {
    root: PathBuf,
}

impl Default for Sysfs {
    fn default() -> Self {
        Self::new(DEFAULT_SYSFS_ROOT)
    }
}

impl Sysfs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths for DRM card `index`.
    pub fn card(&self, index: u32) -> DrmCard {
        DrmCard {
            device: self
                .root
                .join("class/drm")
                .join(format!("card{}", index))
                .join("device"),
        }
    }
}

/// Counter locations below `class/drm/card<N>/device`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrmCard {
    device: PathBuf,
}

impl DrmCard {
    pub fn device_dir(&self) -> &Path {
        &self.device
    }

    /// AMD busy percentage (0-100).
    pub fn gpu_busy_percent(&self) -> PathBuf {
        self.device.join("gpu_busy_percent")
    }

    pub fn vram_total(&self) -> PathBuf {
        self.device.join("mem_info_vram_total")
    }

    pub fn vram_used(&self) -> PathBuf {
        self.device.join("mem_info_vram_used")
    }

    /// Intel render-standby residency counter, only checked for existence.
    pub fn rc6_residency(&self) -> PathBuf {
        self.device.join("power/rc6_residency_ms")
    }

    /// Intel actual GT frequency in MHz.
    pub fn act_freq_mhz(&self) -> PathBuf {
        self.device.join("gt_act_freq_mhz")
    }

    /// Intel maximum (RP0) GT frequency in MHz.
    pub fn rp0_freq_mhz(&self) -> PathBuf {
        self.device.join("gt_RP0_freq_mhz")
    }

    /// Directory holding the card's `hwmon*` entries.
    pub fn hwmon_dir(&self) -> PathBuf {
        self.device.join(HWMON_PREFIX)
    }
}

/// Read a file holding a single integer.
pub fn read_int(path: &Path) -> Result<i64> {
    let content = fs::read_to_string(path).map_err(|e| SystemError::io(path, e))?;
    parse_int(&content)
}

/// Read `file` from the first `hwmon*` directory under `dir` that has it.
pub fn read_int_glob(dir: &Path, file: &str) -> Result<i64> {
    let path = first_hwmon_file(dir, file).ok_or_else(|| SystemError::GlobNoMatch {
        pattern: dir
            .join(format!("{}*", HWMON_PREFIX))
            .join(file)
            .display()
            .to_string(),
    })?;
    read_int(&path)
}

/// Parse trimmed text as a base-10 integer.
pub fn parse_int(content: &str) -> Result<i64> {
    let trimmed = content.trim();
    trimmed
        .parse::<i64>()
        .map_err(|e| SystemError::parse_error(trimmed, e))
}

/// Path of `file` inside the lexicographically first `hwmon*` entry of
/// `dir` that contains it.
pub fn first_hwmon_file(dir: &Path, file: &str) -> Option<PathBuf> {
    let mut monitors: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .flatten()
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(HWMON_PREFIX))
        .map(|entry| entry.path())
        .collect();
    monitors.sort();

    monitors
        .into_iter()
        .map(|monitor| monitor.join(file))
        .find(|path| path.exists())
}
