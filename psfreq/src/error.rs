use std::path::PathBuf;

use itertools::Itertools;
use procfs::ProcError;

use crate::controller::DefaultStep;
use crate::options::CpuSetOptionsBuilderError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error on `{}`: `{source}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Proc error: `{0}`")]
    Proc(#[from] ProcError),

    #[error("Unable to parse `{value}` read from `{}`", .path.display())]
    Parse { path: PathBuf, value: String },
    #[error("Unsupported system: scaling driver is `{0}`, intel_pstate is required")]
    UnsupportedSystem(String),
    #[error("Unable to build the `{0}` path table: no logical CPUs found")]
    Allocation(String),
    #[error("Partially applied `{item}`: {applied} of {total} CPUs written before CPU {failed_cpu} failed")]
    PartialApply {
        item: String,
        failed_cpu: usize,
        applied: usize,
        total: usize,
        #[source]
        source: Box<Error>,
    },
    #[error("Control file `{}` does not exist", .0.display())]
    MissingControl(PathBuf),
    #[error("cpuinfo_max_freq reads as 0")]
    ZeroMaxFrequency,
    #[error("Expected {expected} frequency samples, got {actual}")]
    ProbeMismatch { expected: usize, actual: usize },
    #[error("Failed to apply sane defaults: {}", .0.iter().map(|(step, _)| step).join(", "))]
    SaneDefaults(Vec<(DefaultStep, Error)>),
    #[error("YAML error: `{0}`")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid options: `{0}`")]
    Options(#[from] CpuSetOptionsBuilderError),
    #[error("Not supported: `{0}`")]
    NotSupported(String),
}

impl Error {
    /// Whether a per-CPU fan-out was aborted partway through.
    pub fn is_partial_apply(&self) -> bool {
        matches!(self, Error::PartialApply { .. })
    }

    /// Whether a fan-out stopped after some CPUs already took the new value.
    pub fn left_inconsistent(&self) -> bool {
        matches!(self, Error::PartialApply { applied, .. } if *applied > 0)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn partial_apply(applied: usize) -> Error {
        Error::PartialApply {
            item: "scaling_governor".to_string(),
            failed_cpu: applied,
            applied,
            total: 4,
            source: Box::new(Error::MissingControl(PathBuf::from("cpu0/cpufreq/scaling_governor"))),
        }
    }

    #[test]
    fn test_partial_apply_at_first_cpu() {
        let err = partial_apply(0);

        assert!(err.is_partial_apply());
        assert!(!err.left_inconsistent());
    }

    #[test]
    fn test_partial_apply_after_some_cpus() {
        let err = partial_apply(2);

        assert!(err.is_partial_apply());
        assert!(err.left_inconsistent());
        assert_eq!(
            err.to_string(),
            "Partially applied `scaling_governor`: 2 of 4 CPUs written before CPU 2 failed"
        );
    }

    #[test]
    fn test_other_errors_are_not_partial_apply() {
        assert!(!Error::ZeroMaxFrequency.is_partial_apply());
        assert!(!Error::ZeroMaxFrequency.left_inconsistent());
    }
}
