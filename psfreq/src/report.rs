use std::fmt::Display;

use colored::Colorize;
use log::warn;
use path_macro::path;
use serde::Serialize;

use crate::controller::percent_of;
use crate::cpu::CpuSet;
use crate::driver::TurboState;
use crate::error::{Error, Result};
use crate::parse::split_words;
use crate::sysfs::strings;

/// Everything `psfreq get` shows.
#[derive(Debug, Clone, Serialize)]
pub struct CpuSnapshot {
    pub driver: String,
    pub profile: &'static str,
    pub logical_cpus: usize,
    pub info_min_percent: u32,
    pub info_max_percent: u32,
    pub scaling_min_percent: u32,
    pub scaling_max_percent: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pstate_min_percent: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pstate_max_percent: Option<i64>,
    pub governor: String,
    pub turbo: TurboState,
    pub available_governors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_scheduler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realtime_mhz: Option<Vec<String>>,
}

impl CpuSet {
    pub fn available_governors(&self) -> Result<Vec<String>> {
        Ok(split_words(
            &self.sysfs.read(strings::SCALING_AVAILABLE_GOVERNORS)?,
        ))
    }

    pub fn io_scheduler(&self) -> Result<String> {
        let block_root = &self.options.block_root;
        let device = &self.options.block_device;
        self.sysfs.read(path!(block_root / device / "queue" / "scheduler"))
    }

    /// Current frequency of every logical CPU in MHz. For display only.
    pub fn realtime_frequencies(&self) -> Result<Vec<String>> {
        let expected = self.logical_count();
        let samples = self.probe.sample_realtime_frequencies_mhz(expected)?;

        if samples.len() != expected {
            return Err(Error::ProbeMismatch {
                expected,
                actual: samples.len(),
            });
        }

        Ok(samples)
    }

    /// Collects the cached state of the last (re)initialization together with
    /// the read-only queries. Queries that fail are left out.
    pub fn snapshot(&self, with_realtime: bool) -> CpuSnapshot {
        CpuSnapshot {
            driver: self.driver_name.clone(),
            profile: self.profile.into(),
            logical_cpus: self.logical_count(),
            info_min_percent: self.info_min_percent(),
            info_max_percent: self.info_max_percent(),
            scaling_min_percent: percent_of(self.info_max_freq_khz, self.scaling_min_freq_khz),
            scaling_max_percent: percent_of(self.info_max_freq_khz, self.scaling_max_freq_khz),
            pstate_min_percent: self.pstate_min_percent,
            pstate_max_percent: self.pstate_max_percent,
            governor: self.governor.clone(),
            turbo: self.turbo,
            available_governors: warn_missing("available governors", self.available_governors())
                .unwrap_or_default(),
            io_scheduler: warn_missing("I/O scheduler", self.io_scheduler()),
            realtime_mhz: if with_realtime {
                warn_missing("realtime frequencies", self.realtime_frequencies())
            } else {
                None
            },
        }
    }
}

fn warn_missing<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Leaving {} out of the snapshot: {}", what, e);
            None
        }
    }
}

impl Display for CpuSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = |name: &str| format!("{:<20}", name).bold();

        writeln!(f, "{} {}", label("scaling driver:"), self.driver.blue())?;
        writeln!(f, "{} {}", label("logical cpus:"), self.logical_cpus)?;
        writeln!(
            f,
            "{} {}% .. {}%",
            label("hardware range:"),
            self.info_min_percent,
            self.info_max_percent
        )?;
        writeln!(
            f,
            "{} {}% .. {}%",
            label("scaling range:"),
            self.scaling_min_percent.to_string().green(),
            self.scaling_max_percent.to_string().green()
        )?;

        if let (Some(min), Some(max)) = (self.pstate_min_percent, self.pstate_max_percent) {
            writeln!(f, "{} {}% .. {}%", label("p-state range:"), min, max)?;
        }

        writeln!(f, "{} {}", label("governor:"), self.governor.cyan())?;
        writeln!(
            f,
            "{} {}",
            label("available:"),
            self.available_governors.join(" ")
        )?;
        writeln!(f, "{} {}", label("turbo boost:"), self.turbo)?;

        if let Some(scheduler) = &self.io_scheduler {
            writeln!(f, "{} {}", label("io scheduler:"), scheduler)?;
        }

        if let Some(realtime) = &self.realtime_mhz {
            for (cpu, mhz) in realtime.iter().enumerate() {
                writeln!(f, "{} {} MHz", label(&format!("cpu{}:", cpu)), mhz)?;
            }
        }

        Ok(())
    }
}
