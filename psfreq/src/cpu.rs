use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::driver::{DriverProfile, TurboState};
use crate::error::{Error, Result};
use crate::options::CpuSetOptions;
use crate::parse;
use crate::probe::{CpuProbe, ProcCpuProbe};
use crate::sysfs::{strings, FsIo, Sysfs, SysfsIo};
use crate::topology::{read_driver_name, CpuTopology};

/// The logical CPUs of this machine and their frequency-scaling state.
///
/// A `CpuSet` only exists once discovery succeeded. The topology, driver
/// and hardware bounds are fixed for its whole lifetime; the scaling bounds,
/// governor and turbo state are a snapshot refreshed by
/// [`CpuSet::reinitialize_dynamic_fields`].
pub struct CpuSet {
    pub(crate) options: CpuSetOptions,
    pub(crate) sysfs: Sysfs,
    pub(crate) probe: Box<dyn CpuProbe>,
    pub(crate) topology: CpuTopology,

    pub(crate) driver_name: String,
    pub(crate) profile: DriverProfile,
    pub(crate) info_min_freq_khz: u64,
    pub(crate) info_max_freq_khz: u64,
    pub(crate) pstate_min_percent: Option<i64>,
    pub(crate) pstate_max_percent: Option<i64>,

    pub(crate) scaling_min_freq_khz: u64,
    pub(crate) scaling_max_freq_khz: u64,
    pub(crate) governor: String,
    pub(crate) turbo: TurboState,
}

impl CpuSet {
    /// Discovers the CPUs of the running system.
    pub fn discover(options: CpuSetOptions) -> Result<Self> {
        Self::discover_with(options, Box::new(FsIo), Box::new(ProcCpuProbe))
    }

    pub fn discover_with(
        options: CpuSetOptions,
        io: Box<dyn SysfsIo>,
        probe: Box<dyn CpuProbe>,
    ) -> Result<Self> {
        let sysfs = Sysfs::with_io(&options.sysfs_root, io);

        let topology = CpuTopology::discover(probe.as_ref())?;
        let driver_name = read_driver_name(&sysfs)?;
        let profile = DriverProfile::detect(&driver_name, options.strict_pstate_only)?;

        let info_max_freq_khz = read_info_freq(&sysfs, strings::CPUINFO_MAX_FREQ)?;
        if info_max_freq_khz == 0 {
            return Err(Error::ZeroMaxFrequency);
        }
        let info_min_freq_khz = parse::to_uint(&sysfs.read(strings::CPUINFO_MIN_FREQ)?);

        let (pstate_min_percent, pstate_max_percent) = if profile.has_percent_controls() {
            (
                read_lenient(&sysfs, strings::PSTATE_MIN_PERF_PCT),
                read_lenient(&sysfs, strings::PSTATE_MAX_PERF_PCT),
            )
        } else {
            (None, None)
        };

        debug!(
            "Discovered {} CPUs, driver {} ({}), cpuinfo {}..{} kHz",
            topology.logical_count(),
            driver_name,
            profile,
            info_min_freq_khz,
            info_max_freq_khz
        );

        let mut cpu_set = Self {
            options,
            sysfs,
            probe,
            topology,
            driver_name,
            profile,
            info_min_freq_khz,
            info_max_freq_khz,
            pstate_min_percent,
            pstate_max_percent,
            scaling_min_freq_khz: 0,
            scaling_max_freq_khz: 0,
            governor: String::new(),
            turbo: TurboState::Unknown,
        };

        cpu_set.reinitialize_dynamic_fields();

        Ok(cpu_set)
    }

    /// Re-reads the scaling bounds, governor and turbo state from CPU 0.
    /// Unreadable fields fall back to 0, an empty governor, and
    /// [`TurboState::Unknown`] respectively.
    pub fn reinitialize_dynamic_fields(&mut self) {
        self.scaling_min_freq_khz = self
            .read_cpu0(self.topology.min_freq_paths())
            .map_or(0, |line| parse::to_uint(&line));

        self.scaling_max_freq_khz = self
            .read_cpu0(self.topology.max_freq_paths())
            .map_or(0, |line| parse::to_uint(&line));

        self.governor = self
            .read_cpu0(self.topology.governor_paths())
            .unwrap_or_default();

        self.turbo = self.get_turbo();
    }

    fn read_cpu0(&self, paths: &[PathBuf]) -> Option<String> {
        let path = paths.first()?;

        match self.sysfs.read(path) {
            Ok(line) => Some(line),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    pub fn options(&self) -> &CpuSetOptions {
        &self.options
    }

    pub fn topology(&self) -> &CpuTopology {
        &self.topology
    }

    pub fn logical_count(&self) -> usize {
        self.topology.logical_count()
    }

    pub fn driver(&self) -> &str {
        &self.driver_name
    }

    pub fn profile(&self) -> DriverProfile {
        self.profile
    }

    pub fn has_pstate(&self) -> bool {
        self.profile.is_pstate()
    }

    pub fn info_min_freq_khz(&self) -> u64 {
        self.info_min_freq_khz
    }

    pub fn info_max_freq_khz(&self) -> u64 {
        self.info_max_freq_khz
    }

    pub fn pstate_min_percent(&self) -> Option<i64> {
        self.pstate_min_percent
    }

    pub fn pstate_max_percent(&self) -> Option<i64> {
        self.pstate_max_percent
    }

    /// Scaling minimum as of the last (re)initialization.
    pub fn scaling_min_freq_khz(&self) -> u64 {
        self.scaling_min_freq_khz
    }

    pub fn scaling_max_freq_khz(&self) -> u64 {
        self.scaling_max_freq_khz
    }

    pub fn governor(&self) -> &str {
        &self.governor
    }

    pub fn turbo(&self) -> TurboState {
        self.turbo
    }
}

fn read_info_freq(sysfs: &Sysfs, item: &str) -> Result<u64> {
    let value = sysfs.read(item)?;

    value.trim().parse::<u64>().map_err(|_| Error::Parse {
        path: sysfs.resolve(item),
        value,
    })
}

fn read_lenient(sysfs: &Sysfs, item: impl AsRef<Path>) -> Option<i64> {
    match sysfs.read(item) {
        Ok(line) => Some(parse::to_int(&line)),
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}
