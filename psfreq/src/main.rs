use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::warn;
use nix::unistd::geteuid;

use psfreq::error::Result;
use psfreq::options::{DEFAULT_BLOCK_DEVICE, DEFAULT_SYSFS_ROOT};
use psfreq::{CpuSet, CpuSetOptionsBuilder};

#[derive(Parser, Debug)]
#[command(version, about)]
struct CliArgs {
    /// Root of the CPU sysfs hierarchy.
    #[arg(long, default_value = DEFAULT_SYSFS_ROOT)]
    sysfs_root: PathBuf,

    /// Fall back to generic cpufreq when the scaling driver is not intel_pstate.
    #[arg(long)]
    allow_generic: bool,

    /// Cap the scaling max at 99% so that it never meets the scaling min.
    #[arg(long)]
    distinct_min_max: bool,

    /// Block device whose I/O scheduler is reported.
    #[arg(long, default_value = DEFAULT_BLOCK_DEVICE)]
    block_device: String,

    /// File to write logs to.
    #[arg(long)]
    log_output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current frequency scaling state.
    Get {
        /// Print YAML instead of text.
        #[arg(long)]
        yaml: bool,

        /// Include the current frequency of every CPU.
        #[arg(long)]
        realtime: bool,
    },

    /// Change the frequency scaling state. Changes apply in the order max, min, turbo, governor.
    Set {
        /// Scaling max as a percentage of the hardware max. 0 and below mean the hardware min.
        #[arg(long, allow_negative_numbers = true)]
        max: Option<i32>,

        /// Scaling min as a percentage of the hardware max. 0 and below mean the hardware min.
        #[arg(long, allow_negative_numbers = true)]
        min: Option<i32>,

        /// Turbo boost.
        #[arg(long)]
        turbo: Option<Toggle>,

        /// Governor to install on every CPU.
        #[arg(long)]
        governor: Option<String>,

        /// Full range, turbo on for intel_pstate, powersave governor.
        #[arg(long, conflicts_with_all = ["max", "min", "turbo", "governor"])]
        sane: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn init_logging(log_output: Option<&PathBuf>) {
    let mut env_logger_builder = pretty_env_logger::formatted_timed_builder();

    env_logger_builder.parse_default_env();

    if let Some(log_output) = log_output {
        let log_file = Box::new(
            OpenOptions::new()
                .append(true)
                .create(true)
                .open(log_output)
                .expect("Can't create file"),
        );

        env_logger_builder.target(pretty_env_logger::env_logger::Target::Pipe(log_file));

        log_panics::init();
    }

    env_logger_builder.init();
}

fn print_state(cpu_set: &CpuSet, yaml: bool, realtime: bool) -> Result<()> {
    let snapshot = cpu_set.snapshot(realtime);

    if yaml {
        print!("{}", serde_yaml::to_string(&snapshot)?);
    } else {
        print!("{}", snapshot);
    }

    Ok(())
}

fn run(cli: CliArgs) -> Result<()> {
    let options = CpuSetOptionsBuilder::default()
        .sysfs_root(cli.sysfs_root)
        .strict_pstate_only(!cli.allow_generic)
        .keep_min_max_distinct_percent(cli.distinct_min_max)
        .block_device(cli.block_device)
        .build()?;

    let mut cpu_set = CpuSet::discover(options)?;

    match cli.command {
        Command::Get { yaml, realtime } => print_state(&cpu_set, yaml, realtime),
        Command::Set {
            max,
            min,
            turbo,
            governor,
            sane,
        } => {
            if !geteuid().is_root() {
                warn!("Not running as root, writes will likely be refused");
            }

            if sane {
                cpu_set.apply_sane_defaults()?;
            } else {
                if let Some(max) = max {
                    cpu_set.set_scaling_max(max)?;
                }
                if let Some(min) = min {
                    cpu_set.set_scaling_min(min)?;
                }
                if let Some(turbo) = turbo {
                    cpu_set.set_turbo(turbo == Toggle::On)?;
                }
                if let Some(governor) = governor {
                    cpu_set.set_governor(&governor)?;
                }
            }

            cpu_set.reinitialize_dynamic_fields();
            print_state(&cpu_set, false, false)
        }
    }
}

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    init_logging(cli.log_output.as_ref());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            ExitCode::FAILURE
        }
    }
}
