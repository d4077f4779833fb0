use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;

use crate::error::Result;
use crate::options::CpuSetOptions;
use crate::parse::strip_line_terminator;
use crate::probe::CpuProbe;
use crate::sysfs::{strings, FsIo, SysfsIo};

pub const INFO_MIN_KHZ: u64 = 800_000;
pub const INFO_MAX_KHZ: u64 = 3_400_000;

/// A throwaway CPU sysfs tree. `block/` next to the CPU root stands in for
/// `/sys/block`.
pub struct FakeSysfs {
    dir: TempDir,
    cpus: usize,
}

impl FakeSysfs {
    pub fn new() -> Self {
        init_logging();

        let dir = TempDir::new().expect("Failed to create a temporary directory");
        fs::create_dir_all(dir.path().join("cpu")).unwrap();

        Self { dir, cpus: 0 }
    }

    fn with_cpus(cpus: usize, driver: &str) -> Self {
        let mut fake = Self::new();
        fake.cpus = cpus;

        for cpu in 0..cpus {
            fake.write_raw(
                &format!("cpu{}/cpufreq/cpuinfo_min_freq", cpu),
                &format!("{}\n", INFO_MIN_KHZ),
            );
            fake.write_raw(
                &format!("cpu{}/cpufreq/cpuinfo_max_freq", cpu),
                &format!("{}\n", INFO_MAX_KHZ),
            );
            fake.write_raw(&format!("cpu{}/cpufreq/scaling_driver", cpu), &format!("{}\n", driver));
        }

        fake.write_cpus("scaling_min_freq", &format!("{}\n", INFO_MIN_KHZ));
        fake.write_cpus("scaling_max_freq", &format!("{}\n", INFO_MAX_KHZ));
        fake.write_cpus("scaling_governor", "powersave\n");
        fake.write_cpus("scaling_available_governors", "performance powersave\n");

        fake
    }

    /// Four files per CPU plus the global `intel_pstate` controls, turbo on.
    pub fn pstate(cpus: usize) -> Self {
        let fake = Self::with_cpus(cpus, "intel_pstate");

        fake.write_raw(strings::PSTATE_NO_TURBO, "0\n");
        fake.write_raw(strings::PSTATE_MIN_PERF_PCT, "23\n");
        fake.write_raw(strings::PSTATE_MAX_PERF_PCT, "100\n");

        fake
    }

    /// An `acpi-cpufreq` machine with `cpufreq/boost`, turbo on.
    pub fn generic(cpus: usize) -> Self {
        let fake = Self::with_cpus(cpus, "acpi-cpufreq");
        fake.write_raw(strings::CPUFREQ_BOOST, "1\n");
        fake
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("cpu")
    }

    pub fn block_root(&self) -> PathBuf {
        self.dir.path().join("block")
    }

    pub fn options(&self) -> CpuSetOptions {
        CpuSetOptions {
            sysfs_root: self.root(),
            block_root: self.block_root(),
            ..Default::default()
        }
    }

    pub fn write_raw(&self, path: &str, contents: &str) {
        let path = self.root().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Writes `cpu{i}/cpufreq/{item}` for every CPU.
    pub fn write_cpus(&self, item: &str, contents: &str) {
        for cpu in 0..self.cpus {
            self.write_raw(&format!("cpu{}/cpufreq/{}", cpu, item), contents);
        }
    }

    pub fn write_block_scheduler(&self, device: &str, contents: &str) {
        let path = self.block_root().join(device).join("queue/scheduler");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn read_raw(&self, path: &str) -> String {
        fs::read_to_string(self.root().join(path)).unwrap()
    }

    pub fn read(&self, path: &str) -> String {
        strip_line_terminator(&self.read_raw(path)).to_string()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.root().join(path).exists()
    }

    pub fn remove(&self, path: &str) {
        fs::remove_file(self.root().join(path)).unwrap();
    }
}

pub struct FixedProbe {
    count: usize,
    mhz: Vec<String>,
}

impl FixedProbe {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            mhz: vec!["1000.000".to_string(); count],
        }
    }

    pub fn with_mhz(mut self, mhz: &[&str]) -> Self {
        self.mhz = mhz.iter().map(|x| x.to_string()).collect();
        self
    }
}

impl CpuProbe for FixedProbe {
    fn count_logical_cpus(&self) -> usize {
        self.count
    }

    fn sample_realtime_frequencies_mhz(&self, count: usize) -> Result<Vec<String>> {
        Ok(self.mhz.iter().take(count).cloned().collect())
    }
}

pub type WriteLog = Rc<RefCell<Vec<(PathBuf, String)>>>;

/// Real file access that logs every successful write and fails writes to
/// selected paths.
pub struct RecordingIo {
    inner: FsIo,
    writes: WriteLog,
    failing: Vec<PathBuf>,
}

impl RecordingIo {
    pub fn new() -> Self {
        Self::failing_on(Vec::new())
    }

    pub fn failing_on(failing: Vec<PathBuf>) -> Self {
        Self {
            inner: FsIo,
            writes: Rc::new(RefCell::new(Vec::new())),
            failing,
        }
    }

    pub fn writes(&self) -> WriteLog {
        self.writes.clone()
    }
}

impl SysfsIo for RecordingIo {
    fn read_line(&self, path: &Path) -> io::Result<String> {
        self.inner.read_line(path)
    }

    fn write_line(&self, path: &Path, value: &str) -> io::Result<()> {
        if self.failing.iter().any(|p| p == path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }

        self.inner.write_line(path, value)?;
        self.writes
            .borrow_mut()
            .push((path.to_path_buf(), value.to_string()));

        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }
}

pub fn init_logging() {
    let _ = pretty_env_logger::formatted_builder()
        .parse_default_env()
        .is_test(true)
        .try_init();
}
