#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Elevator control logic (hardware-agnostic).
//!
//! This crate moves a single car between numbered floors. All hardware
//! interactions go through `lift_traits::Actuator`, and every outward event
//! goes through `lift_traits::Notifier`.
//!
//! ## Architecture
//!
//! - **Controller**: the movement state machine (`controller` module)
//! - **Timers**: cancelable one-shot and periodic deadlines (`timers`)
//! - **Debounce**: time-window stabilization of raw sensor edges (`debounce`)
//! - **Idle**: random floor wandering while nobody is riding (`idle`)
//! - **Runner**: single-threaded loop fed by a channel (`runner`)
//! - **Commands**: operator verbs and event-bus JSON (`command`)
//!
//! Time is always passed in. The controller never sleeps, so tests drive it
//! with `lift_traits::ManualClock`.

pub mod builder;
pub mod command;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod debounce;
pub mod error;
pub mod hw_error;
pub mod idle;
pub mod mocks;
pub mod runner;
pub mod sensors;
pub mod status;
pub mod timers;

pub use builder::{build_controller, Lift, LiftBuilder, Missing, Set};
pub use command::{parse_line, Event, ParseError};
pub use config::{DriveMode, IdleCfg, LiftCfg, TimingCfg};
pub use controller::Controller;
pub use error::{BuildError, ControlError, Report, Result};
pub use runner::Runner;
pub use sensors::{SensorMap, SensorRole};
pub use status::{CommandOrigin, LiftStatus, MotionCommand, MotorState};
pub use timers::{TimerCategory, TimerHandle, TimerRegistry};
