//! Get/set operations on a discovered [`CpuSet`].
//!
//! Per-CPU writes go out in ascending CPU order and stop at the first
//! failure. CPUs written before the failure keep the new value, the rest keep
//! their old one; the returned [`Error::PartialApply`] says where it stopped.
//! Under intel_pstate the global `*_perf_pct` clamp is written only after
//! every CPU took the new frequency. If that last write fails the error is a
//! plain [`Error::Io`], and the global clamp lags behind the per-CPU values.
//! Setters are idempotent, so re-running one after a partial apply is safe.

use std::fmt::Display;
use std::path::PathBuf;

use log::{debug, info, warn};
use strum::Display as StrumDisplay;

use crate::cpu::CpuSet;
use crate::driver::TurboState;
use crate::error::{Error, Result};
use crate::parse;
use crate::sysfs::strings;

pub const INFO_MAX_PERCENT: u32 = 100;

/// `info_max_khz * percent / 100`, truncated. `percent` is capped at 100.
pub fn absolute_freq(info_max_khz: u64, percent: u32) -> u64 {
    info_max_khz * percent.min(100) as u64 / 100
}

/// `freq_khz` as a rounded percentage of `info_max_khz`.
pub fn percent_of(info_max_khz: u64, freq_khz: u64) -> u32 {
    if info_max_khz == 0 {
        return 0;
    }

    (freq_khz as f64 / info_max_khz as f64 * 100.0).round() as u32
}

fn clamp_percent(percent: i32) -> u32 {
    percent.clamp(0, 100) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum DefaultStep {
    #[strum(serialize = "scaling max")]
    ScalingMax,
    #[strum(serialize = "scaling min")]
    ScalingMin,
    #[strum(serialize = "turbo")]
    Turbo,
    #[strum(serialize = "governor")]
    Governor,
}

impl CpuSet {
    /// Hardware minimum as a truncated percentage of the hardware maximum.
    pub fn info_min_percent(&self) -> u32 {
        (self.info_min_freq_khz * 100 / self.info_max_freq_khz) as u32
    }

    pub fn info_max_percent(&self) -> u32 {
        INFO_MAX_PERCENT
    }

    /// Percentage actually applied by [`CpuSet::set_scaling_max`].
    pub fn scaling_max_target(&self, percent: i32) -> u32 {
        match clamp_percent(percent) {
            100 if self.options.keep_min_max_distinct_percent => INFO_MAX_PERCENT - 1,
            100 => INFO_MAX_PERCENT,
            0 => (self.info_min_percent() + 1).min(INFO_MAX_PERCENT),
            p => p,
        }
    }

    /// Percentage actually applied by [`CpuSet::set_scaling_min`].
    pub fn scaling_min_target(&self, percent: i32) -> u32 {
        match clamp_percent(percent) {
            100 => INFO_MAX_PERCENT - 1,
            0 => self.info_min_percent(),
            p => p,
        }
    }

    fn fan_out(&self, item: &str, paths: &[PathBuf], value: impl Display) -> Result<()> {
        let value = value.to_string();

        for (cpu, path) in paths.iter().enumerate() {
            if let Err(e) = self.sysfs.write(path, &value) {
                warn!("Stopped writing {} at CPU {}: {}", item, cpu, e);

                return Err(Error::PartialApply {
                    item: item.to_string(),
                    failed_cpu: cpu,
                    applied: cpu,
                    total: paths.len(),
                    source: Box::new(e),
                });
            }

            info!("CPU {} {} set to {}", cpu, item, value);
        }

        Ok(())
    }

    pub fn set_scaling_max(&self, percent: i32) -> Result<()> {
        let target = self.scaling_max_target(percent);
        let freq = absolute_freq(self.info_max_freq_khz, target);

        debug!("Requested scaling max {}%, applying {}% = {} kHz", percent, target, freq);

        self.fan_out(strings::SCALING_MAX_FREQ, self.topology.max_freq_paths(), freq)?;

        if self.profile.has_percent_controls() {
            self.sysfs.write(strings::PSTATE_MAX_PERF_PCT, target)?;
            info!("P-state max_perf_pct set to {}", target);
        }

        Ok(())
    }

    pub fn set_scaling_min(&self, percent: i32) -> Result<()> {
        let target = self.scaling_min_target(percent);
        let freq = absolute_freq(self.info_max_freq_khz, target);

        debug!("Requested scaling min {}%, applying {}% = {} kHz", percent, target, freq);

        self.fan_out(strings::SCALING_MIN_FREQ, self.topology.min_freq_paths(), freq)?;

        if self.profile.has_percent_controls() {
            self.sysfs.write(strings::PSTATE_MIN_PERF_PCT, target)?;
            info!("P-state min_perf_pct set to {}", target);
        }

        Ok(())
    }

    /// Writes `governor` verbatim to every CPU. Whether the kernel knows the
    /// governor is up to the caller, see [`CpuSet::available_governors`].
    pub fn set_governor(&self, governor: &str) -> Result<()> {
        self.fan_out(
            strings::SCALING_GOVERNOR,
            self.topology.governor_paths(),
            governor,
        )
    }

    pub fn set_turbo(&self, enabled: bool) -> Result<()> {
        let path = self.profile.turbo_control_path();

        if !self.sysfs.exists(path) {
            return Err(Error::MissingControl(self.sysfs.resolve(path)));
        }

        let raw = self.profile.turbo_semantics().encode(enabled);
        self.sysfs.write(path, raw)?;

        info!(
            "Turbo boost {} ({} = {})",
            if enabled { "enabled" } else { "disabled" },
            path,
            raw
        );

        Ok(())
    }

    fn get_scaling(&self, paths: &[PathBuf]) -> Result<u32> {
        let line = self.sysfs.read(&paths[0])?;
        Ok(percent_of(self.info_max_freq_khz, parse::to_uint(&line)))
    }

    /// Live scaling minimum of CPU 0, as a percentage of the hardware max.
    pub fn get_scaling_min(&self) -> Result<u32> {
        self.get_scaling(self.topology.min_freq_paths())
    }

    pub fn get_scaling_max(&self) -> Result<u32> {
        self.get_scaling(self.topology.max_freq_paths())
    }

    pub fn get_governor(&self) -> Result<String> {
        self.sysfs.read(&self.topology.governor_paths()[0])
    }

    pub fn get_turbo(&self) -> TurboState {
        match self.sysfs.read(self.profile.turbo_control_path()) {
            Ok(line) => self.profile.turbo_semantics().decode(parse::to_int(&line)),
            Err(e) => {
                debug!("Could not discover turbo boost value: {}", e);
                TurboState::Unknown
            }
        }
    }

    /// Full range, turbo on where the P-state driver runs, and the powersave
    /// governor. Every step is attempted even if an earlier one fails.
    pub fn apply_sane_defaults(&self) -> Result<()> {
        let steps = [
            (DefaultStep::ScalingMax, self.set_scaling_max(100)),
            (DefaultStep::ScalingMin, self.set_scaling_min(0)),
            (DefaultStep::Turbo, self.set_turbo(self.has_pstate())),
            (DefaultStep::Governor, self.set_governor("powersave")),
        ];

        let failures: Vec<(DefaultStep, Error)> = steps
            .into_iter()
            .filter_map(|(step, result)| result.err().map(|e| (step, e)))
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::SaneDefaults(failures))
        }
    }
}
