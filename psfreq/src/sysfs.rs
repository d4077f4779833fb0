use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use path_macro::path;

use crate::error::{Error, Result};
use crate::parse::strip_line_terminator;

pub mod strings {
    pub const SCALING_DRIVER: &'static str = "cpu0/cpufreq/scaling_driver";
    pub const SCALING_AVAILABLE_GOVERNORS: &'static str =
        "cpu0/cpufreq/scaling_available_governors";
    pub const CPUINFO_MIN_FREQ: &'static str = "cpu0/cpufreq/cpuinfo_min_freq";
    pub const CPUINFO_MAX_FREQ: &'static str = "cpu0/cpufreq/cpuinfo_max_freq";

    pub const SCALING_MIN_FREQ: &'static str = "scaling_min_freq";
    pub const SCALING_MAX_FREQ: &'static str = "scaling_max_freq";
    pub const SCALING_GOVERNOR: &'static str = "scaling_governor";

    pub const PSTATE_MIN_PERF_PCT: &'static str = "intel_pstate/min_perf_pct";
    pub const PSTATE_MAX_PERF_PCT: &'static str = "intel_pstate/max_perf_pct";
    pub const PSTATE_NO_TURBO: &'static str = "intel_pstate/no_turbo";
    pub const CPUFREQ_BOOST: &'static str = "cpufreq/boost";
}

/// Line-oriented primitives on virtual files. Paths handed to an
/// implementation are always fully resolved.
pub trait SysfsIo {
    /// Reads the file and strips exactly one trailing line terminator.
    fn read_line(&self, path: &Path) -> io::Result<String>;

    /// Writes `value` followed by a line terminator.
    fn write_line(&self, path: &Path, value: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

pub struct FsIo;

impl SysfsIo for FsIo {
    fn read_line(&self, path: &Path) -> io::Result<String> {
        let contents = fs::read_to_string(path)?;
        Ok(strip_line_terminator(&contents).to_string())
    }

    fn write_line(&self, path: &Path, value: &str) -> io::Result<()> {
        fs::write(path, format!("{}\n", value))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Scoped access to the CPU sysfs hierarchy. Relative paths resolve against
/// `root`, absolute paths are used as they are.
pub struct Sysfs {
    root: PathBuf,
    io: Box<dyn SysfsIo>,
}

impl Sysfs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_io(root, Box::new(FsIo))
    }

    pub fn with_io(root: impl Into<PathBuf>, io: Box<dyn SysfsIo>) -> Self {
        Self {
            root: root.into(),
            io,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            path!(self.root / path)
        }
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = self.resolve(path);

        self.io
            .read_line(&path)
            .map_err(|source| Error::Io { path, source })
    }

    pub fn write(&self, path: impl AsRef<Path>, value: impl Display) -> Result<()> {
        let path = self.resolve(path);
        let value = value.to_string();

        debug!("Writing `{}` to {}", value, path.display());

        self.io
            .write_line(&path, &value)
            .map_err(|source| Error::Io { path, source })
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.io.exists(&self.resolve(path))
    }
}
