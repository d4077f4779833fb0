use log::{debug, warn};
use procfs::{CpuInfo, Current};

use crate::error::{Error, Result};

const CPU_MHZ_FIELD: &str = "cpu MHz";

/// Facts about the processors that do not come from the cpufreq hierarchy.
pub trait CpuProbe {
    /// Number of logical CPUs, or 0 if it cannot be determined.
    fn count_logical_cpus(&self) -> usize;

    /// Current frequency of the first `count` CPUs, in MHz, as reported.
    fn sample_realtime_frequencies_mhz(&self, count: usize) -> Result<Vec<String>>;
}

/// Reads `/proc/cpuinfo`.
pub struct ProcCpuProbe;

impl CpuProbe for ProcCpuProbe {
    fn count_logical_cpus(&self) -> usize {
        match CpuInfo::current() {
            Ok(cpuinfo) => {
                let n = cpuinfo.num_cores();
                debug!("Number of cpus: {}", n);
                n
            }
            Err(e) => {
                warn!("Failed to find number of cpus: {}", e);
                0
            }
        }
    }

    fn sample_realtime_frequencies_mhz(&self, count: usize) -> Result<Vec<String>> {
        let cpuinfo = CpuInfo::current()?;

        (0..count)
            .map(|cpu| {
                cpuinfo
                    .get_field(cpu, CPU_MHZ_FIELD)
                    .map(|mhz| mhz.trim().to_string())
                    .ok_or_else(|| {
                        Error::NotSupported(format!("CPU {} does not report `{}`", cpu, CPU_MHZ_FIELD))
                    })
            })
            .collect()
    }
}
