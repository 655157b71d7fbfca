//! Runtime configuration for the controller.
//!
//! These are the structs the controller is built from. They are separate
//! from the TOML-deserialized config in `lift_config`; see `conversions`.

use std::time::Duration;

/// How the car is moved between floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveMode {
    /// No sensors: the controller advances one floor per step timer.
    #[default]
    TimedStep,
    /// Floor sensors report position; stop is issued after the lag delay.
    Feedback,
}

impl DriveMode {
    pub fn name(&self) -> &'static str {
        match self {
            DriveMode::TimedStep => "timed",
            DriveMode::Feedback => "feedback",
        }
    }
}

/// Building geometry.
#[derive(Debug, Clone)]
pub struct LiftCfg {
    /// Number of floors; valid floors are `1..=floors`.
    pub floors: u8,
    /// Logical floor at start-up.
    pub boot_floor: u8,
    /// Floor the car returns to when a rider approaches.
    pub ground_floor: u8,
}

impl Default for LiftCfg {
    fn default() -> Self {
        Self {
            floors: 8,
            boot_floor: 1,
            ground_floor: 1,
        }
    }
}

/// Delays used by the controller's timers and the sensor debouncer.
#[derive(Debug, Clone)]
pub struct TimingCfg {
    /// Time per floor in timed-step mode.
    pub step: Duration,
    /// Run-on after a floor sensor trips (feedback mode).
    pub lag: Duration,
    /// Hold after a ride before `RideComplete` and idle re-arm.
    pub end_of_ride: Duration,
    /// Idle-wander period.
    pub idle_period: Duration,
    /// Sensor stabilization window.
    pub debounce: Duration,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(1000),
            lag: Duration::from_millis(500),
            end_of_ride: Duration::from_millis(15_000),
            idle_period: Duration::from_millis(20_000),
            debounce: Duration::from_millis(50),
        }
    }
}

/// Idle wandering.
#[derive(Debug, Clone)]
pub struct IdleCfg {
    pub enabled: bool,
    /// Seed for the floor picker; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for IdleCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: None,
        }
    }
}
