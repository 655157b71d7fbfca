//! `From` implementations bridging `lift_config` types to `lift_core` types.

use std::time::Duration;

use crate::config::{DriveMode, IdleCfg, LiftCfg, TimingCfg};
use crate::error::ControlError;
use crate::sensors::SensorMap;

// ── LiftCfg ──────────────────────────────────────────────────────────────────

impl From<&lift_config::Floors> for LiftCfg {
    fn from(c: &lift_config::Floors) -> Self {
        Self {
            floors: c.count,
            boot_floor: c.boot_floor,
            ground_floor: c.ground_floor,
        }
    }
}

// ── TimingCfg ────────────────────────────────────────────────────────────────

impl From<&lift_config::Timing> for TimingCfg {
    fn from(c: &lift_config::Timing) -> Self {
        Self {
            step: Duration::from_millis(c.step_ms),
            lag: Duration::from_millis(c.lag_ms),
            end_of_ride: Duration::from_millis(c.end_of_ride_ms),
            idle_period: Duration::from_millis(c.idle_period_ms),
            debounce: Duration::from_millis(c.debounce_ms),
        }
    }
}

// ── DriveMode ────────────────────────────────────────────────────────────────

impl From<lift_config::DriveMode> for DriveMode {
    fn from(m: lift_config::DriveMode) -> Self {
        match m {
            lift_config::DriveMode::Timed => DriveMode::TimedStep,
            lift_config::DriveMode::Feedback => DriveMode::Feedback,
        }
    }
}

// ── IdleCfg ──────────────────────────────────────────────────────────────────

impl From<&lift_config::Idle> for IdleCfg {
    fn from(c: &lift_config::Idle) -> Self {
        Self {
            enabled: c.enabled,
            seed: c.seed,
        }
    }
}

// ── SensorMap ────────────────────────────────────────────────────────────────

impl TryFrom<&lift_config::Pins> for SensorMap {
    type Error = ControlError;
    fn try_from(p: &lift_config::Pins) -> Result<Self, Self::Error> {
        SensorMap::new(&p.floor_sensors, p.motion_sensor)
    }
}
