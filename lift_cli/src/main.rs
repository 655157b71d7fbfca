mod cli;
mod error_fmt;
mod notify;
mod ride;

use std::path::Path;

use clap::Parser;
use lift_core::error::ControlError;
use lift_core::{DriveMode, IdleCfg};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE, json_mode};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        if json_mode() {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = lift_config::load_file(&cli.config)
        .map_err(|e| eyre::Report::new(ControlError::Config(format!("{e:#}"))))?;

    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    init_tracing(cli.json, &level, &cfg.logging);
    tracing::info!(
        config = %cli.config.display(),
        floors = cfg.floors.count,
        "config loaded"
    );

    let mode_of = |m: Option<cli::ModeArg>| -> DriveMode {
        m.map(DriveMode::from)
            .unwrap_or_else(|| DriveMode::from(cfg.drive.mode))
    };

    match cli.cmd {
        Commands::Run {
            mode,
            seed,
            no_idle,
        } => {
            let mut idle = IdleCfg::from(&cfg.idle);
            if seed.is_some() {
                idle.seed = seed;
            }
            if no_idle {
                idle.enabled = false;
            }
            ride::run(&cfg, mode_of(mode), idle)
        }
        Commands::Goto { floor, mode } => ride::goto(&cfg, mode_of(mode), floor),
        Commands::Rider { mode } => ride::rider(&cfg, mode_of(mode)),
        Commands::SelfCheck => ride::self_check(&cfg, DriveMode::from(cfg.drive.mode)),
    }
}

/// Console logs go to stderr (pretty, or JSON with `--json`); an optional
/// JSON-lines file sink comes from `[logging]`.
fn init_tracing(json: bool, level: &str, logging: &lift_config::Logging) {
    use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let file = logging.file.as_deref().map(|path| {
        let path = Path::new(path);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "lift.log".into());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init();
}
