use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use psfreq::error::Result;
use psfreq::probe::CpuProbe;
use psfreq::CpuSetOptions;
use tempfile::TempDir;

static INIT: Once = Once::new();

pub fn setup() {
    INIT.call_once(|| {
        pretty_env_logger::env_logger::builder()
            .is_test(true)
            .init();
    });
}

pub struct Probe(pub usize);

impl CpuProbe for Probe {
    fn count_logical_cpus(&self) -> usize {
        self.0
    }

    fn sample_realtime_frequencies_mhz(&self, count: usize) -> Result<Vec<String>> {
        Ok((0..count).map(|cpu| format!("{}.000", 1000 + cpu)).collect())
    }
}

/// An intel_pstate machine with `cpus` CPUs ranging 800 MHz..3.4 GHz.
pub fn pstate_tree(cpus: usize) -> TempDir {
    let dir = TempDir::new().unwrap();

    for cpu in 0..cpus {
        for (item, value) in [
            ("cpuinfo_min_freq", "800000"),
            ("cpuinfo_max_freq", "3400000"),
            ("scaling_min_freq", "800000"),
            ("scaling_max_freq", "3400000"),
            ("scaling_governor", "powersave"),
            ("scaling_driver", "intel_pstate"),
            ("scaling_available_governors", "performance powersave"),
        ] {
            write(dir.path(), &format!("cpu{}/cpufreq/{}", cpu, item), value);
        }
    }

    write(dir.path(), "intel_pstate/no_turbo", "0");
    write(dir.path(), "intel_pstate/min_perf_pct", "23");
    write(dir.path(), "intel_pstate/max_perf_pct", "100");

    dir
}

pub fn options(root: &Path) -> CpuSetOptions {
    CpuSetOptions {
        sysfs_root: root.to_path_buf(),
        ..Default::default()
    }
}

pub fn write(root: &Path, path: &str, value: &str) {
    let path: PathBuf = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, format!("{}\n", value)).unwrap();
}

pub fn read(root: &Path, path: &str) -> String {
    fs::read_to_string(root.join(path))
        .unwrap()
        .trim_end()
        .to_string()
}
