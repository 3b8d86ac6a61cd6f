//! GPU metrics for AMD and Intel (kernel sysfs) and NVIDIA (`nvidia-smi`).
//!
//! The string functions at the bottom of this module are what a status bar
//! calls: they target GPU 0 on the live system and return either a display
//! ready value (`"42%"`, `"25.0%"`, `"65°C"`) or [`crate::UNKNOWN_STR`].
//! Use [`GpuSampler`] directly to get the typed value or the reason a metric
//! is unavailable.

pub mod normalize;
pub mod smi;
pub mod sysfs;
pub mod vendor;

pub use normalize::GpuSampler;
pub use smi::{CommandRunner, NvidiaSmi, SmiQuery, SystemRunner, NVIDIA_SMI};
pub use sysfs::{DrmCard, Sysfs, DEFAULT_SYSFS_ROOT};
pub use vendor::{detect, GpuVendor};

use super::or_unknown;

/// GPU busy percentage, e.g. `"42%"`.
pub fn gpu_perc() -> String {
    or_unknown(GpuSampler::new().utilization())
}

/// VRAM usage percentage, e.g. `"25.0%"`.
pub fn gpu_mem_perc() -> String {
    or_unknown(GpuSampler::new().memory())
}

/// GPU temperature, e.g. `"65°C"`.
pub fn gpu_temp() -> String {
    or_unknown(GpuSampler::new().temperature())
}
