//! Backend assembly (config → actuator + sensors) and the subcommands built on it.

use std::io::BufRead;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use eyre::WrapErr;
use lift_config::Config;
use lift_core::error::Result;
use lift_core::{
    CommandOrigin, DriveMode, Event, IdleCfg, Lift, LiftCfg, LiftStatus, Runner, SensorMap,
    TimingCfg, build_controller, parse_line,
};
use lift_hardware::EdgeSink;
use lift_traits::{Actuator, MonotonicClock};

use crate::cli::json_mode;
use crate::notify::CliNotifier;

#[cfg(all(feature = "hardware", target_os = "linux"))]
type Watcher = lift_hardware::gpio::SensorWatcher;
#[cfg(not(all(feature = "hardware", target_os = "linux")))]
type Watcher = ();

type CliRunner = Runner<Box<dyn Actuator>, CliNotifier, MonotonicClock>;

/// Drive backend chosen from config and mode.
pub struct Backend {
    pub actuator: Box<dyn Actuator>,
    pub sensors: SensorMap,
    /// Keeps sensor interrupts registered.
    watcher: Option<Watcher>,
}

fn edge_sink(tx: Sender<Event>) -> EdgeSink {
    Arc::new(move |channel, level| {
        let _ = tx.send(Event::SensorEdge { channel, level });
    })
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn config_err(msg: impl Into<String>) -> eyre::Report {
    eyre::Report::new(lift_core::ControlError::Config(msg.into()))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
/// Sensor channels for floors `1..=count`: the configured pins, or the floor
/// numbers themselves when none are configured (simulation only).
fn floor_channels(cfg: &Config) -> Vec<u8> {
    if cfg.pins.floor_sensors.is_empty() {
        (1..=cfg.floors.count).collect()
    } else {
        cfg.pins.floor_sensors.clone()
    }
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn build_backend(cfg: &Config, mode: DriveMode, tx: &Sender<Event>) -> Result<Backend> {
    use lift_hardware::{ShaftSim, SimulatedMotor, SimulatedStepper};

    match mode {
        DriveMode::TimedStep => {
            let sensors = SensorMap::try_from(&cfg.pins)?;
            tracing::info!(floors = cfg.floors.count, "simulated timed-step car");
            Ok(Backend {
                actuator: Box::new(SimulatedStepper::new(cfg.floors.count)),
                sensors,
                watcher: None,
            })
        }
        DriveMode::Feedback => {
            let channels = floor_channels(cfg);
            let sensors = SensorMap::new(&channels, cfg.pins.motion_sensor)?;
            let shaft = ShaftSim {
                floors: cfg.floors.count,
                boot_floor: cfg.floors.boot_floor,
                channels,
                floor_time: std::time::Duration::from_millis(cfg.timing.step_ms),
            };
            let motor = SimulatedMotor::with_shaft(shaft, edge_sink(tx.clone()))
                .wrap_err("start shaft simulation")?;
            tracing::info!(floors = cfg.floors.count, "simulated feedback car");
            Ok(Backend {
                actuator: Box::new(motor),
                sensors,
                watcher: None,
            })
        }
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn build_backend(cfg: &Config, mode: DriveMode, tx: &Sender<Event>) -> Result<Backend> {
    use lift_hardware::gpio::{GpioIndicatorActuator, GpioMotorActuator, SensorWatcher};

    let hw = |e: lift_hardware::error::HwError| {
        eyre::Report::new(lift_core::ControlError::ActuatorFault(e.to_string()))
    };
    let actuator: Box<dyn Actuator> = match mode {
        DriveMode::TimedStep => {
            Box::new(GpioIndicatorActuator::new(&cfg.pins.indicators).map_err(hw)?)
        }
        DriveMode::Feedback => {
            let (true, Some(up), Some(down)) =
                (cfg.has_feedback_pins(), cfg.pins.motor_up, cfg.pins.motor_down)
            else {
                return Err(config_err(
                    "feedback mode needs pins.motor_up, pins.motor_down and pins.floor_sensors",
                ));
            };
            Box::new(GpioMotorActuator::new(up, down).map_err(hw)?)
        }
    };
    let sensors = SensorMap::try_from(&cfg.pins)?;
    let pins: Vec<u8> = sensors.channels().collect();
    let watcher = if pins.is_empty() {
        None
    } else {
        let sink = edge_sink(tx.clone());
        Some(SensorWatcher::watch(&pins, cfg.sensors.active_low, sink).map_err(hw)?)
    };
    tracing::info!(mode = mode.name(), sensors = pins.len(), "gpio backend ready");
    Ok(Backend {
        actuator,
        sensors,
        watcher,
    })
}

fn make_runner(
    cfg: &Config,
    mode: DriveMode,
    idle: IdleCfg,
    backend: Backend,
) -> Result<(CliRunner, Option<Watcher>)> {
    let Backend {
        actuator,
        sensors,
        watcher,
    } = backend;
    let controller = build_controller(
        actuator,
        CliNotifier::new(json_mode()),
        LiftCfg::from(&cfg.floors),
        TimingCfg::from(&cfg.timing),
        mode,
        idle,
    )?;
    Ok((Runner::new(controller, sensors, MonotonicClock::new()), watcher))
}

fn install_ctrlc(tx: Sender<Event>) {
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = tx.send(Event::Shutdown);
    }) {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
    }
}

fn spawn_stdin_reader(tx: Sender<Event>) -> Result<()> {
    std::thread::Builder::new()
        .name("lift-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin read failed");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(&line) {
                    Ok(ev) => {
                        if tx.send(ev).is_err() {
                            return;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, line = line.trim(), "ignoring input line"),
                }
            }
            tracing::debug!("stdin closed");
            let _ = tx.send(Event::Shutdown);
        })
        .wrap_err("spawn stdin reader")?;
    Ok(())
}

fn print_outcome(what: &str, status: &LiftStatus) {
    if json_mode() {
        println!(
            "{}",
            serde_json::json!({ "event": what, "floor": status.floor, "at_rest": status.at_rest() })
        );
    } else {
        println!("{what} at floor {}", status.floor);
    }
}

/// `run`: serve stdin (and sensors) until EOF or Ctrl-C.
pub fn run(cfg: &Config, mode: DriveMode, idle: IdleCfg) -> Result<()> {
    let (tx, rx) = unbounded();
    let idle_on = idle.enabled;
    let backend = build_backend(cfg, mode, &tx)?;
    let (mut runner, _watcher) = make_runner(cfg, mode, idle, backend)?;
    install_ctrlc(tx.clone());
    spawn_stdin_reader(tx.clone())?;
    drop(tx);
    tracing::info!(mode = mode.name(), idle = idle_on, "lift running");
    let status = runner.run(&rx);
    print_outcome("stopped", &status);
    Ok(())
}

fn one_shot(cfg: &Config, mode: DriveMode, event: Event, what: &str) -> Result<()> {
    let (tx, rx): (Sender<Event>, Receiver<Event>) = unbounded();
    let backend = build_backend(cfg, mode, &tx)?;
    let idle = IdleCfg {
        enabled: false,
        seed: None,
    };
    let (mut runner, _watcher) = make_runner(cfg, mode, idle, backend)?;
    install_ctrlc(tx.clone());
    runner.start();
    runner.handle(event)?;
    let status = runner.run_until(&rx, |s| s.at_rest());
    drop(tx);
    if status.at_rest() {
        print_outcome(what, &status);
    } else {
        print_outcome("interrupted", &status);
    }
    Ok(())
}

/// `goto`: ride to `floor` and exit once the car stops.
pub fn goto(cfg: &Config, mode: DriveMode, floor: i64) -> Result<()> {
    one_shot(
        cfg,
        mode,
        Event::GoTo {
            floor,
            origin: CommandOrigin::Manual,
        },
        "arrived",
    )
}

/// `rider`: return to the ground floor and request a capture.
pub fn rider(cfg: &Config, mode: DriveMode) -> Result<()> {
    one_shot(cfg, mode, Event::RiderApproaching, "rider captured")
}

/// `self-check`: config is already validated; build the backend and a controller.
pub fn self_check(cfg: &Config, mode: DriveMode) -> Result<()> {
    let (tx, _rx) = unbounded();
    let backend = build_backend(cfg, mode, &tx)?;
    let lift = Lift::builder()
        .with_actuator(backend.actuator)
        .with_notifier(CliNotifier::new(false))
        .with_lift(LiftCfg::from(&cfg.floors))
        .with_timing(TimingCfg::from(&cfg.timing))
        .with_mode(mode)
        .without_idle()
        .build()?;
    println!(
        "self-check ok: {} floors, {} mode, {} sensor channels",
        lift.floors(),
        lift.mode().name(),
        backend.sensors.channels().count()
    );
    Ok(())
}
