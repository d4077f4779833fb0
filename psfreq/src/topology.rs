use std::path::PathBuf;

use log::debug;
use path_macro::path;

use crate::error::{Error, Result};
use crate::probe::CpuProbe;
use crate::sysfs::{strings, Sysfs};

fn get_cpufreq_dir(cpu: usize) -> PathBuf {
    format!("cpu{}/cpufreq", cpu).into()
}

/// `cpu{i}/cpufreq/scaling_{what}` for every CPU in `0..count`.
pub fn build_path_vector(count: usize, what: &str) -> Result<Vec<PathBuf>> {
    let item = format!("scaling_{}", what);

    if count == 0 {
        return Err(Error::Allocation(item));
    }

    let vector: Vec<PathBuf> = (0..count)
        .map(|cpu| path!(get_cpufreq_dir(cpu) / item))
        .collect();

    debug!("Built {} paths for {}", vector.len(), item);

    Ok(vector)
}

pub fn read_driver_name(sysfs: &Sysfs) -> Result<String> {
    let driver = sysfs.read(strings::SCALING_DRIVER)?;
    debug!("Scaling driver: {}", driver);
    Ok(driver)
}

/// Logical CPUs and the per-CPU files that control them. The three tables
/// are index-aligned and never resized.
#[derive(Debug)]
pub struct CpuTopology {
    min_freq_paths: Vec<PathBuf>,
    max_freq_paths: Vec<PathBuf>,
    governor_paths: Vec<PathBuf>,
}

impl CpuTopology {
    pub fn discover(probe: &dyn CpuProbe) -> Result<Self> {
        let count = probe.count_logical_cpus();
        Self::with_count(count)
    }

    pub fn with_count(count: usize) -> Result<Self> {
        Ok(Self {
            min_freq_paths: build_path_vector(count, "min_freq")?,
            max_freq_paths: build_path_vector(count, "max_freq")?,
            governor_paths: build_path_vector(count, "governor")?,
        })
    }

    pub fn logical_count(&self) -> usize {
        self.governor_paths.len()
    }

    pub fn min_freq_paths(&self) -> &[PathBuf] {
        &self.min_freq_paths
    }

    pub fn max_freq_paths(&self) -> &[PathBuf] {
        &self.max_freq_paths
    }

    pub fn governor_paths(&self) -> &[PathBuf] {
        &self.governor_paths
    }
}
