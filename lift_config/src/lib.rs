#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the lift controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section has defaults, so an empty file describes the stock
//!   eight-floor demo car in timed-step mode.
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Indicator LED pins of the demo car, one per floor (floor 1 first).
///
/// BCM numbers; on the header these are physical pins 3, 5, 7, 11, 13, 15, 19, 21.
pub const DEFAULT_INDICATOR_PINS: [u8; 8] = [2, 3, 4, 17, 27, 22, 10, 9];

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Floors {
    /// Number of floors served; floors are numbered 1..=count.
    pub count: u8,
    /// Logical floor assumed at start-up.
    pub boot_floor: u8,
    /// Floor the car returns to when a rider approaches.
    pub ground_floor: u8,
}

impl Default for Floors {
    fn default() -> Self {
        Self {
            count: 8,
            boot_floor: 1,
            ground_floor: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriveMode {
    /// Open loop: the controller paces one floor per step.
    #[default]
    Timed,
    /// Closed loop: floor sensors report position, motor runs until told to stop.
    Feedback,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Drive {
    pub mode: DriveMode,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Time per floor in timed-step mode.
    pub step_ms: u64,
    /// Extra run time after a floor sensor trips before stopping.
    pub lag_ms: u64,
    /// Hold after a ride before `RideComplete` fires and idle wandering resumes.
    pub end_of_ride_ms: u64,
    /// Period of the idle-wander timer.
    pub idle_period_ms: u64,
    /// Stabilization window for sensor inputs.
    pub debounce_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            step_ms: 1000,
            lag_ms: 500,
            end_of_ride_ms: 15_000,
            idle_period_ms: 20_000,
            debounce_ms: 50,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Idle {
    pub enabled: bool,
    /// Fixed seed for the wander picker; random when absent.
    pub seed: Option<u64>,
}

impl Default for Idle {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    /// Indicator outputs, one per floor (timed-step mode).
    pub indicators: Vec<u8>,
    /// Motor direction outputs (feedback mode).
    pub motor_up: Option<u8>,
    pub motor_down: Option<u8>,
    /// Floor proximity inputs, one per floor (feedback mode).
    pub floor_sensors: Vec<u8>,
    /// Motion-detect input.
    pub motion_sensor: Option<u8>,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            indicators: DEFAULT_INDICATOR_PINS.to_vec(),
            motor_up: None,
            motor_down: None,
            floor_sensors: Vec::new(),
            motion_sensor: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sensors {
    /// Treat a low level as "active" (switch closed to ground).
    pub active_low: bool,
}

impl Default for Sensors {
    fn default() -> Self {
        Self { active_low: true }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub floors: Floors,
    pub drive: Drive,
    pub timing: Timing,
    pub idle: Idle,
    pub pins: Pins,
    pub sensors: Sensors,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Floors
        let n = self.floors.count;
        if n == 0 {
            eyre::bail!("floors.count must be >= 1");
        }
        if !(1..=n).contains(&self.floors.boot_floor) {
            eyre::bail!("floors.boot_floor must be in [1, {n}]");
        }
        if !(1..=n).contains(&self.floors.ground_floor) {
            eyre::bail!("floors.ground_floor must be in [1, {n}]");
        }

        // Timing
        if self.timing.step_ms == 0 {
            eyre::bail!("timing.step_ms must be >= 1");
        }
        if self.timing.lag_ms == 0 {
            eyre::bail!("timing.lag_ms must be >= 1");
        }
        if self.timing.debounce_ms == 0 {
            eyre::bail!("timing.debounce_ms must be >= 1");
        }
        if self.timing.idle_period_ms < 1000 {
            eyre::bail!("timing.idle_period_ms must be >= 1000");
        }
        if self.timing.end_of_ride_ms > 60 * 60 * 1000 {
            eyre::bail!("timing.end_of_ride_ms is unreasonably large (>1h)");
        }

        // Pins
        if !self.pins.indicators.is_empty() && self.pins.indicators.len() != usize::from(n) {
            eyre::bail!(
                "pins.indicators must list one pin per floor ({n}), got {}",
                self.pins.indicators.len()
            );
        }
        if !self.pins.floor_sensors.is_empty() && self.pins.floor_sensors.len() != usize::from(n)
        {
            eyre::bail!(
                "pins.floor_sensors must list one pin per floor ({n}), got {}",
                self.pins.floor_sensors.len()
            );
        }
        let mut seen = HashSet::new();
        for pin in self
            .pins
            .floor_sensors
            .iter()
            .chain(self.pins.motion_sensor.iter())
        {
            if !seen.insert(*pin) {
                eyre::bail!("sensor pin {pin} is assigned twice");
            }
        }
        if let (Some(up), Some(down)) = (self.pins.motor_up, self.pins.motor_down)
            && up == down
        {
            eyre::bail!("pins.motor_up and pins.motor_down must differ");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }

    /// Whether the config carries everything the feedback backend needs.
    pub fn has_feedback_pins(&self) -> bool {
        self.pins.motor_up.is_some()
            && self.pins.motor_down.is_some()
            && self.pins.floor_sensors.len() == usize::from(self.floors.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_the_demo_car() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg.floors.count, 8);
        assert_eq!(cfg.drive.mode, DriveMode::Timed);
        assert_eq!(cfg.pins.indicators, DEFAULT_INDICATOR_PINS.to_vec());
        cfg.validate().unwrap();
    }

    #[test]
    fn feedback_pins_require_full_sensor_list() {
        let cfg = load_toml(
            r#"
[pins]
motor_up = 20
motor_down = 21
floor_sensors = [4, 17]
"#,
        )
        .unwrap();
        assert!(!cfg.has_feedback_pins());
    }
}
