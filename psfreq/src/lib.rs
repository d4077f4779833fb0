//! Control of CPU frequency scaling through the Linux cpufreq sysfs
//! interface, with first-class support for the Intel P-state driver.

pub mod controller;
pub mod cpu;
pub mod driver;
pub mod error;
pub mod options;
pub mod parse;
pub mod probe;
pub mod report;
pub mod sysfs;
pub mod topology;

#[cfg(test)]
pub(crate) mod test_utils;

pub use cpu::CpuSet;
pub use driver::{DriverProfile, TurboState};
pub use options::{CpuSetOptions, CpuSetOptionsBuilder};
