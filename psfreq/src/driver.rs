use std::fmt::Display;

use colored::Colorize;
use log::debug;
use serde::Serialize;
use strum::{Display as StrumDisplay, IntoStaticStr};

use crate::error::{Error, Result};
use crate::sysfs::strings;

pub const INTEL_PSTATE: &str = "intel_pstate";

pub fn has_pstate(driver_name: &str) -> bool {
    driver_name == INTEL_PSTATE
}

/// How the turbo control file encodes "turbo enabled".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurboSemantics {
    /// `intel_pstate/no_turbo`: 0 means turbo is on.
    Inverted,
    /// `cpufreq/boost`: 1 means turbo is on.
    Direct,
}

impl TurboSemantics {
    pub fn encode(&self, enabled: bool) -> u8 {
        match self {
            TurboSemantics::Inverted => (!enabled) as u8,
            TurboSemantics::Direct => enabled as u8,
        }
    }

    pub fn decode(&self, raw: i64) -> TurboState {
        let set = raw != 0;

        match self {
            TurboSemantics::Inverted if set => TurboState::Disabled,
            TurboSemantics::Inverted => TurboState::Enabled,
            TurboSemantics::Direct if set => TurboState::Enabled,
            TurboSemantics::Direct => TurboState::Disabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurboState {
    Unknown,
    Disabled,
    Enabled,
}

impl TurboState {
    pub fn as_raw(&self) -> i8 {
        match self {
            TurboState::Unknown => -1,
            TurboState::Disabled => 0,
            TurboState::Enabled => 1,
        }
    }
}

impl Display for TurboState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurboState::Unknown => "unknown".yellow().fmt(f),
            TurboState::Disabled => "off".red().fmt(f),
            TurboState::Enabled => "on".green().fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, IntoStaticStr)]
pub enum DriverProfile {
    #[strum(serialize = "intel_pstate")]
    Pstate,
    #[strum(serialize = "cpufreq")]
    GenericCpufreq,
}

impl DriverProfile {
    /// Picks the profile for `driver_name`. Under `strict_pstate_only`, any
    /// driver other than intel_pstate is rejected.
    pub fn detect(driver_name: &str, strict_pstate_only: bool) -> Result<Self> {
        if has_pstate(driver_name) {
            return Ok(DriverProfile::Pstate);
        }

        if strict_pstate_only {
            return Err(Error::UnsupportedSystem(driver_name.to_string()));
        }

        debug!(
            "Driver `{}` is not {}, falling back to generic cpufreq",
            driver_name, INTEL_PSTATE
        );

        Ok(DriverProfile::GenericCpufreq)
    }

    pub fn is_pstate(&self) -> bool {
        matches!(self, DriverProfile::Pstate)
    }

    pub fn turbo_control_path(&self) -> &'static str {
        match self {
            DriverProfile::Pstate => strings::PSTATE_NO_TURBO,
            DriverProfile::GenericCpufreq => strings::CPUFREQ_BOOST,
        }
    }

    pub fn turbo_semantics(&self) -> TurboSemantics {
        match self {
            DriverProfile::Pstate => TurboSemantics::Inverted,
            DriverProfile::GenericCpufreq => TurboSemantics::Direct,
        }
    }

    /// Whether the global `intel_pstate/{min,max}_perf_pct` clamps exist.
    pub fn has_percent_controls(&self) -> bool {
        self.is_pstate()
    }
}
