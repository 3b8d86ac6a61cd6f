//! GPU vendor detection.

use super::smi::{CommandRunner, NVIDIA_SMI};
use super::sysfs::Sysfs;
use crate::error::{Result, SystemError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported GPU vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuVendor {
    Amd,
    Intel,
    Nvidia,
}

impl GpuVendor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd => "amd",
            Self::Intel => "intel",
            Self::Nvidia => "nvidia",
        }
    }
}

impl fmt::Display for GpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify GPU `index`.
///
/// Checks run in a fixed order and the first hit wins, even when several
/// interfaces are present:
/// 1. AMD `gpu_busy_percent` exists
/// 2. Intel `power/rc6_residency_ms` exists
/// 3. `nvidia-smi` resolves on `PATH`
///
/// Only existence is checked; file contents are validated later by the
/// metric readers.
pub fn detect<R: CommandRunner + ?Sized>(
    sysfs: &Sysfs,
    runner: &R,
    index: u32,
) -> Result<GpuVendor> {
    let card = sysfs.card(index);

    if card.gpu_busy_percent().exists() {
        return Ok(GpuVendor::Amd);
    }

    if card.rc6_residency().exists() {
        return Ok(GpuVendor::Intel);
    }

    if runner.resolve(NVIDIA_SMI) {
        return Ok(GpuVendor::Nvidia);
    }

    Err(SystemError::VendorNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct PathLookup(bool);

    impl CommandRunner for PathLookup {
        fn resolve(&self, program: &str) -> bool {
            self.0 && program == NVIDIA_SMI
        }

        fn run(&self, program: &str, _args: &[&str]) -> Result<String> {
            Err(SystemError::ToolUnavailable {
                tool: program.to_string(),
            })
        }
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_nothing_present() {
        let tmp = TempDir::new().unwrap();
        let sysfs = Sysfs::new(tmp.path());
        let err = detect(&sysfs, &PathLookup(false), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VendorNotFound);
    }

    #[test]
    fn test_amd_wins_over_nvidia() {
        let tmp = TempDir::new().unwrap();
        let sysfs = Sysfs::new(tmp.path());
        // Content is irrelevant at detection time.
        touch(&sysfs.card(0).gpu_busy_percent());

        assert_eq!(detect(&sysfs, &PathLookup(true), 0).unwrap(), GpuVendor::Amd);
    }

    #[test]
    fn test_amd_wins_over_intel() {
        let tmp = TempDir::new().unwrap();
        let sysfs = Sysfs::new(tmp.path());
        touch(&sysfs.card(0).rc6_residency());
        touch(&sysfs.card(0).gpu_busy_percent());

        assert_eq!(detect(&sysfs, &PathLookup(false), 0).unwrap(), GpuVendor::Amd);
    }

    #[test]
    fn test_intel_wins_over_nvidia() {
        let tmp = TempDir::new().unwrap();
        let sysfs = Sysfs::new(tmp.path());
        touch(&sysfs.card(0).rc6_residency());

        assert_eq!(
            detect(&sysfs, &PathLookup(true), 0).unwrap(),
            GpuVendor::Intel
        );
    }

    #[test]
    fn test_nvidia_from_path_lookup() {
        let tmp = TempDir::new().unwrap();
        let sysfs = Sysfs::new(tmp.path());
        assert_eq!(
            detect(&sysfs, &PathLookup(true), 0).unwrap(),
            GpuVendor::Nvidia
        );
    }

    #[test]
    fn test_index_selects_card() {
        let tmp = TempDir::new().unwrap();
        let sysfs = Sysfs::new(tmp.path());
        touch(&sysfs.card(1).gpu_busy_percent());

        assert!(detect(&sysfs, &PathLookup(false), 0).is_err());
        assert_eq!(detect(&sysfs, &PathLookup(false), 1).unwrap(), GpuVendor::Amd);
    }

    #[test]
    fn test_vendor_tags() {
        assert_eq!(GpuVendor::Amd.to_string(), "amd");
        assert_eq!(GpuVendor::Intel.to_string(), "intel");
        assert_eq!(serde_json::to_string(&GpuVendor::Nvidia).unwrap(), "\"nvidia\"");
    }
}
