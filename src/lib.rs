//! # glstatus - memory and GPU usage for a status bar
//!
//! A small Linux sampler that renders one status line such as
//! `Mem: 37.5% Free: 3.2G Temp: 65°C GPU: 12% VRAM: 25.0% ` on a fixed
//! interval.
//!
//! ## Features
//!
//! - **Memory**: usage and free memory from `/proc/meminfo`
//! - **GPU vendor detection**: AMD and Intel through kernel sysfs, NVIDIA
//!   through `nvidia-smi`, checked in that order
//! - **Uniform units**: every GPU reading is normalised to a percentage or
//!   whole degrees Celsius, or reported as unavailable
//! - **Library + Binary**: use the readers as a crate or run `glstatus`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glstatus::{gpu_perc, gpu_temp, GpuSampler};
//!
//! // Display-ready strings, "n/a" on any failure.
//! println!("GPU {} at {}", gpu_perc(), gpu_temp());
//!
//! // Typed values with the failure reason.
//! match GpuSampler::new().memory() {
//!     Ok(value) => println!("VRAM {}", value),
//!     Err(err) => eprintln!("VRAM unavailable: {}", err),
//! }
//! ```

pub mod error;
pub mod metrics;
pub mod status;

// Re-export public API
pub use error::{ErrorKind, Result, SystemError};
pub use metrics::{
    collector::SystemCollector,
    data::{Component, GpuReading, MetricValue, StatusSnapshot},
    gpu::{gpu_mem_perc, gpu_perc, gpu_temp, GpuSampler, GpuVendor},
    ram::{ram_free, ram_perc, MemInfo},
    traits::MetricsProvider,
};

pub use status::{default_modules, render_line, start_stream, Module, StatusConfig};

/// The default sampling interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Placeholder shown for any metric that could not be read
pub const UNKNOWN_STR: &str = "n/a";
