//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

#[derive(Parser, Debug)]
#[command(name = "lift", version, about = "Elevator controller CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/lift_config.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty; notifications are also printed as JSON on stdout
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Drive mode override.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    /// Step one floor per step period, no sensors
    Timed,
    /// Floor sensors report position
    Feedback,
}

impl From<ModeArg> for lift_core::DriveMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Timed => lift_core::DriveMode::TimedStep,
            ModeArg::Feedback => lift_core::DriveMode::Feedback,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the controller, reading commands from stdin until EOF or Ctrl-C
    Run {
        /// Override [drive].mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Seed for idle wandering (overrides [idle].seed)
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
        /// Disable idle wandering
        #[arg(long, action = ArgAction::SetTrue)]
        no_idle: bool,
    },
    /// Ride to one floor and exit
    Goto {
        /// Destination floor (1-based)
        #[arg(long, allow_negative_numbers = true)]
        floor: i64,
        /// Override [drive].mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Run the rider-approach sequence once and exit
    Rider {
        /// Override [drive].mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Validate config and actuator construction
    SelfCheck,
}
