pub mod error;
pub mod util;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use lift_traits::Actuator;

use crate::error::HwError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Receives sensor edges as `(channel, active)`; called from foreign threads.
pub type EdgeSink = Arc<dyn Fn(u8, bool) + Send + Sync>;

/// Direction the simulated motor is currently driven in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Drive {
    #[default]
    Off,
    Up,
    Down,
}

/// Timed-step actuator without a motor: only floor indicators.
///
/// Indicator state is held in memory and logged, so a run without GPIO
/// still shows which floor is lit.
pub struct SimulatedStepper {
    lit: Vec<bool>,
}

impl SimulatedStepper {
    pub fn new(floors: u8) -> Self {
        SimulatedStepper {
            lit: vec![false; usize::from(floors)],
        }
    }

    /// Floors whose indicator is currently on.
    pub fn lit_floors(&self) -> Vec<u8> {
        (1..=self.lit.len())
            .filter(|f| self.lit[f - 1])
            .filter_map(|f| u8::try_from(f).ok())
            .collect()
    }
}

impl Actuator for SimulatedStepper {
    fn drive_up(&mut self) -> Result<(), BoxError> {
        tracing::trace!("stepper: up (simulated)");
        Ok(())
    }
    fn drive_down(&mut self) -> Result<(), BoxError> {
        tracing::trace!("stepper: down (simulated)");
        Ok(())
    }
    fn stop(&mut self) -> Result<(), BoxError> {
        tracing::trace!("stepper: stop (simulated)");
        Ok(())
    }
    fn set_indicator(&mut self, floor: u8, on: bool) -> Result<(), BoxError> {
        let slot = usize::from(floor)
            .checked_sub(1)
            .and_then(|i| self.lit.get_mut(i))
            .ok_or(HwError::NoSuchIndicator(floor))?;
        *slot = on;
        tracing::info!(floor, on, "indicator (simulated)");
        Ok(())
    }
}

/// Shaft geometry for a simulated feedback car.
#[derive(Debug, Clone)]
pub struct ShaftSim {
    pub floors: u8,
    pub boot_floor: u8,
    /// Sensor channel for each floor, lowest first.
    pub channels: Vec<u8>,
    /// Travel time between adjacent floors.
    pub floor_time: Duration,
}

struct ShaftState {
    drive: Mutex<Drive>,
    stop: AtomicBool,
}

/// Feedback actuator for simulation.
///
/// With a shaft attached, a background thread moves a virtual car while the
/// motor runs and reports floor sensor edges to the sink; each floor sensor
/// stays active for half a floor's travel time.
pub struct SimulatedMotor {
    state: Arc<ShaftState>,
    worker: Option<JoinHandle<()>>,
}

impl Default for SimulatedMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedMotor {
    /// Motor without a shaft: drive commands are only logged.
    pub fn new() -> Self {
        SimulatedMotor {
            state: Arc::new(ShaftState {
                drive: Mutex::new(Drive::Off),
                stop: AtomicBool::new(false),
            }),
            worker: None,
        }
    }

    pub fn with_shaft(shaft: ShaftSim, sink: EdgeSink) -> std::io::Result<Self> {
        let mut motor = Self::new();
        let state = Arc::clone(&motor.state);
        let handle = std::thread::Builder::new()
            .name("lift-shaft-sim".into())
            .spawn(move || run_shaft(&state, &shaft, &sink))?;
        motor.worker = Some(handle);
        Ok(motor)
    }

    pub fn drive(&self) -> Drive {
        self.state.drive.lock().map(|d| *d).unwrap_or_default()
    }

    fn set_drive(&self, drive: Drive) -> Result<(), BoxError> {
        let mut d = self
            .state
            .drive
            .lock()
            .map_err(|_| HwError::Gpio("simulated motor state poisoned".into()))?;
        *d = drive;
        tracing::debug!(?drive, "motor (simulated)");
        Ok(())
    }
}

impl Drop for SimulatedMotor {
    fn drop(&mut self) {
        self.state.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.worker.take() {
            let _ = h.join();
        }
    }
}

impl Actuator for SimulatedMotor {
    fn drive_up(&mut self) -> Result<(), BoxError> {
        self.set_drive(Drive::Up)
    }
    fn drive_down(&mut self) -> Result<(), BoxError> {
        self.set_drive(Drive::Down)
    }
    fn stop(&mut self) -> Result<(), BoxError> {
        self.set_drive(Drive::Off)
    }
    fn set_indicator(&mut self, floor: u8, on: bool) -> Result<(), BoxError> {
        tracing::trace!(floor, on, "indicator (simulated, ignored)");
        Ok(())
    }
}

fn run_shaft(state: &ShaftState, shaft: &ShaftSim, sink: &EdgeSink) {
    let half = shaft.floor_time / 2;
    let slice = Duration::from_millis(5);
    let channel = |floor: u8| {
        usize::from(floor)
            .checked_sub(1)
            .and_then(|i| shaft.channels.get(i))
            .copied()
    };
    let mut pos = shaft.boot_floor;
    loop {
        if !util::sleep_unless_stopped(&state.stop, half, slice) {
            return;
        }
        let drive = state.drive.lock().map(|d| *d).unwrap_or_default();
        let next = match drive {
            Drive::Up if pos < shaft.floors => pos + 1,
            Drive::Down if pos > 1 => pos - 1,
            _ => continue,
        };
        pos = next;
        let Some(ch) = channel(pos) else {
            tracing::warn!(floor = pos, "no sensor channel for floor");
            continue;
        };
        tracing::trace!(floor = pos, channel = ch, "shaft sim: passing floor");
        sink(ch, true);
        let finished = util::sleep_unless_stopped(&state.stop, half, slice);
        sink(ch, false);
        if !finished {
            return;
        }
    }
}
