use std::path::PathBuf;

use derive_builder::Builder;

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/devices/system/cpu";
pub const DEFAULT_BLOCK_ROOT: &str = "/sys/block";
pub const DEFAULT_BLOCK_DEVICE: &str = "sda";

#[derive(Debug, Clone, Builder)]
#[builder(default, pattern = "owned", setter(into))]
pub struct CpuSetOptions {
    /// Root of the CPU sysfs hierarchy
    pub sysfs_root: PathBuf,

    /// Refuse to run unless the scaling driver is intel_pstate
    pub strict_pstate_only: bool,

    /// Clamp a 100% scaling max down to 99% so that min and max never meet
    pub keep_min_max_distinct_percent: bool,

    /// Root of the block device hierarchy
    pub block_root: PathBuf,

    /// Block device whose I/O scheduler is reported
    pub block_device: String,
}

impl Default for CpuSetOptions {
    fn default() -> Self {
        Self {
            sysfs_root: DEFAULT_SYSFS_ROOT.into(),
            strict_pstate_only: true,
            keep_min_max_distinct_percent: false,
            block_root: DEFAULT_BLOCK_ROOT.into(),
            block_device: DEFAULT_BLOCK_DEVICE.to_string(),
        }
    }
}
