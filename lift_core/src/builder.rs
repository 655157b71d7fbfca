//! Type-state builder for `Lift` and generic `build_controller` constructor.
//!
//! The builder enforces at compile time that an actuator and a notifier are
//! provided before `build()` is available. `try_build()` is always available
//! for dynamic checks.

use std::marker::PhantomData;

use lift_traits::{Actuator, Notifier};

use crate::config::{DriveMode, IdleCfg, LiftCfg, TimingCfg};
use crate::controller::Controller;
use crate::error::{BuildError, Result};
use crate::idle::IdleScheduler;

/// Dynamically dispatched controller, as built by `LiftBuilder`.
pub type Lift = Controller<Box<dyn Actuator>, Box<dyn Notifier>>;

impl Lift {
    /// Start building a Lift.
    pub fn builder() -> LiftBuilder<Missing, Missing> {
        LiftBuilder::default()
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Lift`. All fields are validated on `build()`.
pub struct LiftBuilder<A, N> {
    actuator: Option<Box<dyn Actuator>>,
    notifier: Option<Box<dyn Notifier>>,
    lift: Option<LiftCfg>,
    timing: Option<TimingCfg>,
    mode: Option<DriveMode>,
    idle: Option<IdleCfg>,
    _a: PhantomData<A>,
    _n: PhantomData<N>,
}

impl Default for LiftBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            actuator: None,
            notifier: None,
            lift: None,
            timing: None,
            mode: None,
            idle: None,
            _a: PhantomData,
            _n: PhantomData,
        }
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

/// Validate configuration and construct a `Controller`.
///
/// Shared by `LiftBuilder::try_build()` and `build_controller()`.
fn validate_and_build<A: Actuator, N: Notifier>(
    actuator: A,
    notifier: N,
    lift: LiftCfg,
    timing: TimingCfg,
    mode: DriveMode,
    idle: IdleCfg,
) -> Result<Controller<A, N>> {
    if lift.floors == 0 {
        return Err(invalid("floors must be >= 1"));
    }
    if !(1..=lift.floors).contains(&lift.boot_floor) {
        return Err(invalid("boot floor out of range"));
    }
    if !(1..=lift.floors).contains(&lift.ground_floor) {
        return Err(invalid("ground floor out of range"));
    }
    if timing.step.is_zero() {
        return Err(invalid("step period must be > 0"));
    }
    if timing.lag.is_zero() {
        return Err(invalid("stop lag must be > 0"));
    }
    if timing.debounce.is_zero() {
        return Err(invalid("debounce window must be > 0"));
    }
    if idle.enabled && timing.idle_period.is_zero() {
        return Err(invalid("idle period must be > 0"));
    }

    let scheduler = IdleScheduler::new(idle.enabled, timing.idle_period, idle.seed);
    Ok(Controller::from_parts(
        actuator, notifier, lift, timing, mode, scheduler,
    ))
}

impl<A, N> LiftBuilder<A, N> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<Lift> {
        let actuator = self
            .actuator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuator))?;
        let notifier = self
            .notifier
            .ok_or_else(|| eyre::Report::new(BuildError::MissingNotifier))?;
        validate_and_build(
            actuator,
            notifier,
            self.lift.unwrap_or_default(),
            self.timing.unwrap_or_default(),
            self.mode.unwrap_or_default(),
            self.idle.unwrap_or_default(),
        )
    }
}

/// Chainable setters that do not affect type-state.
impl<A, N> LiftBuilder<A, N> {
    pub fn with_lift(mut self, lift: LiftCfg) -> Self {
        self.lift = Some(lift);
        self
    }
    pub fn with_timing(mut self, timing: TimingCfg) -> Self {
        self.timing = Some(timing);
        self
    }
    pub fn with_mode(mut self, mode: DriveMode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn with_idle(mut self, idle: IdleCfg) -> Self {
        self.idle = Some(idle);
        self
    }
    /// Shorthand for a disabled idle scheduler.
    pub fn without_idle(mut self) -> Self {
        let mut idle = self.idle.unwrap_or_default();
        idle.enabled = false;
        self.idle = Some(idle);
        self
    }
}

// Setters that advance type-state
impl<N> LiftBuilder<Missing, N> {
    pub fn with_actuator(self, actuator: impl Actuator + 'static) -> LiftBuilder<Set, N> {
        LiftBuilder {
            actuator: Some(Box::new(actuator)),
            notifier: self.notifier,
            lift: self.lift,
            timing: self.timing,
            mode: self.mode,
            idle: self.idle,
            _a: PhantomData,
            _n: PhantomData,
        }
    }
}

impl<A> LiftBuilder<A, Missing> {
    pub fn with_notifier(self, notifier: impl Notifier + 'static) -> LiftBuilder<A, Set> {
        LiftBuilder {
            actuator: self.actuator,
            notifier: Some(Box::new(notifier)),
            lift: self.lift,
            timing: self.timing,
            mode: self.mode,
            idle: self.idle,
            _a: PhantomData,
            _n: PhantomData,
        }
    }
}

impl LiftBuilder<Set, Set> {
    /// Validate and build. Only available once actuator and notifier are set.
    pub fn build(self) -> Result<Lift> {
        self.try_build()
    }
}

/// Build a statically dispatched controller from a concrete actuator and notifier.
pub fn build_controller<A, N>(
    actuator: A,
    notifier: N,
    lift: LiftCfg,
    timing: TimingCfg,
    mode: DriveMode,
    idle: IdleCfg,
) -> Result<Controller<A, N>>
where
    A: Actuator,
    N: Notifier,
{
    validate_and_build(actuator, notifier, lift, timing, mode, idle)
}
