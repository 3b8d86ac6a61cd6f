//! Per-vendor extraction and normalisation of GPU metrics.
//!
//! Each metric follows the same shape: detect the vendor, pull the raw
//! reading(s) from sysfs or `nvidia-smi`, convert to canonical units, then
//! range check. Any failure along the way is returned as the error that
//! caused it; nothing is clamped and nothing is retried.

use super::vendor::{self, GpuVendor};
use super::smi::{CommandRunner, NvidiaSmi, SystemRunner};
use super::sysfs::{self, DrmCard, Sysfs, BYTES_PER_MIB};
use crate::error::{Result, SystemError};
use crate::metrics::data::{GpuReading, MetricValue};
use std::cell::Cell;

/// Handle on one GPU plus the sources its metrics are read from.
///
/// By default the vendor is re-detected on every metric call, so a driver
/// swap is picked up on the next sample. With [`with_vendor_cache`] the
/// first successful detection is reused until [`redetect`] is called.
///
/// [`with_vendor_cache`]: GpuSampler::with_vendor_cache
/// [`redetect`]: GpuSampler::redetect
#[derive(Debug)]
pub struct GpuSampler<R = SystemRunner> {
    sysfs: Sysfs,
    runner: R,
    index: u32,
    cache_vendor: bool,
    vendor: Cell<Option<GpuVendor>>,
}

impl GpuSampler<SystemRunner> {
    /// GPU 0 on the live system.
    pub fn new() -> Self {
        Self::with_runner(Sysfs::default(), SystemRunner)
    }
}

impl Default for GpuSampler<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> GpuSampler<R> {
    pub fn with_runner(sysfs: Sysfs, runner: R) -> Self {
        Self {
            sysfs,
            runner,
            index: 0,
            cache_vendor: false,
            vendor: Cell::new(None),
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self.vendor.set(None);
        self
    }

    /// Keep the first detected vendor for the lifetime of the sampler.
    pub fn with_vendor_cache(mut self, enabled: bool) -> Self {
        self.cache_vendor = enabled;
        self
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn sysfs(&self) -> &Sysfs {
        &self.sysfs
    }

    /// Vendor of this GPU, from cache when caching is enabled.
    pub fn detect(&self) -> Result<GpuVendor> {
        if self.cache_vendor {
            if let Some(vendor) = self.vendor.get() {
                return Ok(vendor);
            }
        }
        self.redetect()
    }

    /// Run detection again, replacing any cached vendor.
    pub fn redetect(&self) -> Result<GpuVendor> {
        let detected = vendor::detect(&self.sysfs, &self.runner, self.index);
        self.vendor.set(detected.as_ref().ok().copied());
        detected
    }

    /// Busy percentage, 0-100.
    pub fn utilization(&self) -> Result<MetricValue> {
        let card = self.card();

        let usage = match self.detect()? {
            GpuVendor::Amd => sysfs::read_int(&card.gpu_busy_percent())?,
            GpuVendor::Intel => {
                // No busy counter on i915; approximate with the frequency ratio.
                let current = sysfs::read_int(&card.act_freq_mhz())?;
                let max = sysfs::read_int(&card.rp0_freq_mhz())?;
                if max == 0 {
                    return Err(SystemError::ZeroTotal {
                        metric: "gpu frequency",
                    });
                }
                (current as f64 / max as f64 * 100.0).round() as i64
            }
            GpuVendor::Nvidia => self.smi().utilization()?,
        };

        if !(0..=100).contains(&usage) {
            return Err(SystemError::out_of_range("gpu utilization", usage as f64));
        }
        Ok(MetricValue::Percent(usage as u32))
    }

    /// VRAM in use as a percentage of total, one decimal place.
    pub fn memory(&self) -> Result<MetricValue> {
        let card = self.card();

        let (used, total) = match self.detect()? {
            GpuVendor::Amd => (
                sysfs::read_int(&card.vram_used())?,
                sysfs::read_int(&card.vram_total())?,
            ),
            GpuVendor::Intel => (
                sysfs::read_int(&card.vram_used())? / BYTES_PER_MIB,
                sysfs::read_int(&card.vram_total())? / BYTES_PER_MIB,
            ),
            GpuVendor::Nvidia => self.smi().memory()?,
        };

        if total == 0 {
            return Err(SystemError::ZeroTotal { metric: "vram" });
        }
        if used < 0 || total < 0 {
            return Err(SystemError::out_of_range("vram", used.min(total) as f64));
        }

        let percent = used as f64 / total as f64 * 100.0;
        if percent > 100.0 {
            return Err(SystemError::out_of_range("vram", percent));
        }
        Ok(MetricValue::PercentTenths(percent))
    }

    /// Core temperature in whole degrees Celsius.
    pub fn temperature(&self) -> Result<MetricValue> {
        let vendor = self.detect()?;

        let celsius = match vendor {
            GpuVendor::Amd | GpuVendor::Intel => {
                let raw = sysfs::read_int_glob(&self.card().hwmon_dir(), "temp1_input")?;
                if raw < 0 {
                    return Err(SystemError::out_of_range("gpu temperature", raw as f64));
                }
                // amdgpu reports millidegrees, i915 whole degrees.
                if vendor == GpuVendor::Amd {
                    raw / 1000
                } else {
                    raw
                }
            }
            GpuVendor::Nvidia => self.smi().temperature()?,
        };

        if celsius < 0 {
            return Err(SystemError::out_of_range("gpu temperature", celsius as f64));
        }
        Ok(MetricValue::Celsius(celsius))
    }

    /// All three metrics; unavailable ones are `None`.
    pub fn sample(&self) -> GpuReading {
        GpuReading {
            vendor: self.detect().ok(),
            utilization: self.utilization().ok(),
            memory: self.memory().ok(),
            temperature: self.temperature().ok(),
        }
    }

    fn card(&self) -> DrmCard {
        self.sysfs.card(self.index)
    }

    fn smi(&self) -> NvidiaSmi<'_, R> {
        NvidiaSmi::new(&self.runner)
    }
}
