//! The movement state machine.
//!
//! `Controller` exclusively owns the car's logical position, its destination,
//! the motor state and every timer. Callers feed it commands, debounced
//! sensor edges and the current time; it answers with actuator calls and
//! notifications. It never sleeps and never reads the actuator back.

use std::cmp::Ordering;
use std::time::Instant;

use lift_traits::{Actuator, Notification, Notifier};

use crate::config::{DriveMode, LiftCfg, TimingCfg};
use crate::error::{ControlError, Result};
use crate::hw_error::map_hw_error;
use crate::idle::IdleScheduler;
use crate::status::{CommandOrigin, LiftStatus, MotionCommand, MotorState};
use crate::timers::{Fired, TimerCategory, TimerRegistry};

pub struct Controller<A: Actuator, N: Notifier> {
    pub(crate) actuator: A,
    pub(crate) notifier: N,
    pub(crate) lift: LiftCfg,
    pub(crate) timing: TimingCfg,
    pub(crate) mode: DriveMode,
    pub(crate) current: u8,
    pub(crate) destination: Option<u8>,
    pub(crate) origin: Option<CommandOrigin>,
    pub(crate) motor: MotorState,
    pub(crate) timers: TimerRegistry,
    pub(crate) idle: IdleScheduler,
    pub(crate) started: bool,
}

impl<A: Actuator, N: Notifier> core::fmt::Debug for Controller<A, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("mode", &self.mode)
            .field("floor", &self.current)
            .field("destination", &self.destination)
            .field("motor", &self.motor)
            .field("live_timers", &self.timers.live_count())
            .finish()
    }
}

impl<A: Actuator, N: Notifier> Controller<A, N> {
    pub(crate) fn from_parts(
        actuator: A,
        notifier: N,
        lift: LiftCfg,
        timing: TimingCfg,
        mode: DriveMode,
        idle: IdleScheduler,
    ) -> Self {
        Self {
            actuator,
            notifier,
            current: lift.boot_floor,
            lift,
            timing,
            mode,
            destination: None,
            origin: None,
            motor: MotorState::Stopped,
            timers: TimerRegistry::new(),
            idle,
            started: false,
        }
    }

    pub fn current_floor(&self) -> u8 {
        self.current
    }

    pub fn destination(&self) -> Option<u8> {
        self.destination
    }

    pub fn motor_state(&self) -> MotorState {
        self.motor
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn floors(&self) -> u8 {
        self.lift.floors
    }

    pub fn live_timers(&self) -> usize {
        self.timers.live_count()
    }

    pub fn live_timers_in(&self, category: TimerCategory) -> usize {
        self.timers.live_in(category)
    }

    pub fn idle_armed(&self) -> bool {
        self.idle.is_armed(&self.timers)
    }

    pub fn status(&self) -> LiftStatus {
        LiftStatus {
            floor: self.current,
            destination: self.destination,
            motor: self.motor,
            live_timers: self.timers.live_count(),
            idle_armed: self.idle_armed(),
        }
    }

    /// Show the boot floor and arm idle wandering. Calling it again is a no-op.
    pub fn start(&mut self, now: Instant) {
        if self.started {
            return;
        }
        self.started = true;
        tracing::info!(
            floor = self.current,
            floors = self.lift.floors,
            mode = self.mode.name(),
            "controller started"
        );
        self.show_floor(self.current, true);
        self.idle.arm(&mut self.timers, now);
    }

    /// Accept a go-to-floor command.
    ///
    /// Non-idle commands cancel every live timer (idle wander and a pending
    /// end-of-ride included); idle wander only supersedes earlier movement.
    pub fn go_to(&mut self, cmd: MotionCommand, now: Instant) -> Result<()> {
        let floor = match self.check_floor(cmd.floor) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(floor = cmd.floor, origin = cmd.origin.name(), "command rejected");
                return Err(e.into());
            }
        };
        tracing::info!(
            from = self.current,
            to = floor,
            origin = cmd.origin.name(),
            "moving elevator"
        );
        if cmd.origin == CommandOrigin::IdleWander {
            self.timers.cancel_category(TimerCategory::Step);
        } else {
            self.idle.disarm(&mut self.timers);
            self.timers.cancel_all();
        }
        self.destination = Some(floor);
        self.origin = Some(cmd.origin);
        self.begin_motion(floor, now)
    }

    /// Convenience for `go_to` with an explicit origin.
    pub fn go_to_floor(&mut self, floor: i64, origin: CommandOrigin, now: Instant) -> Result<()> {
        self.go_to(MotionCommand { floor, origin }, now)
    }

    /// Return to the ground floor, then publish `MotionDetected`.
    pub fn rider_approaching(&mut self, now: Instant) -> Result<()> {
        tracing::info!(floor = self.current, "rider approaching, returning to ground floor");
        self.go_to(
            MotionCommand {
                floor: i64::from(self.lift.ground_floor),
                origin: CommandOrigin::RiderApproach,
            },
            now,
        )
    }

    /// A debounced floor sensor became active.
    pub fn on_floor_sensor(&mut self, floor: u8, now: Instant) {
        if self.mode == DriveMode::TimedStep {
            tracing::debug!(floor, "floor sensor ignored in timed mode");
            return;
        }
        if !(1..=self.lift.floors).contains(&floor) {
            tracing::warn!(floor, "floor sensor outside building");
            return;
        }
        if floor != self.current {
            tracing::info!(floor, "... floor");
        }
        self.current = floor;
        self.publish(Notification::CurrentFloorChanged { floor });
        self.check_stop(now);
    }

    /// A debounced motion detector became active.
    pub fn on_motion_sensor(&mut self, now: Instant) -> Result<()> {
        tracing::info!("motion detected");
        self.rider_approaching(now)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Run the earliest timer due by `now`, if any.
    pub fn fire_next_due(&mut self, now: Instant) -> Option<Result<()>> {
        let fired = self.timers.pop_due(now)?;
        Some(self.on_timer(fired))
    }

    /// Run every timer due by `now`, in deadline order. Failures are logged.
    pub fn poll_timers(&mut self, now: Instant) -> usize {
        let mut n = 0;
        while let Some(res) = self.fire_next_due(now) {
            n += 1;
            if let Err(e) = res {
                tracing::warn!(error = %e, "timer action failed");
            }
        }
        n
    }

    /// Cancel everything and make sure the motor is off.
    pub fn shutdown(&mut self) {
        self.idle.disarm(&mut self.timers);
        let cancelled = self.timers.cancel_all();
        if let Err(e) = self.actuator.stop() {
            tracing::error!(error = %map_hw_error(e.as_ref()), "stop failed during shutdown");
        }
        self.motor = MotorState::Stopped;
        self.destination = None;
        self.origin = None;
        tracing::info!(floor = self.current, cancelled, "controller shut down");
    }

    fn check_floor(&self, floor: i64) -> core::result::Result<u8, ControlError> {
        u8::try_from(floor)
            .ok()
            .filter(|f| (1..=self.lift.floors).contains(f))
            .ok_or(ControlError::InvalidFloor {
                floor,
                floors: self.lift.floors,
            })
    }

    fn begin_motion(&mut self, dest: u8, now: Instant) -> Result<()> {
        match dest.cmp(&self.current) {
            Ordering::Greater => self.drive(MotorState::MovingUp, now)?,
            Ordering::Less => self.drive(MotorState::MovingDown, now)?,
            Ordering::Equal => {
                if self.mode == DriveMode::Feedback && self.motor.is_moving() {
                    // Still running on from the last confirmed floor: the car stops
                    // one lag past that floor's sensor and reports that floor.
                    self.arm_stop_lag(now);
                } else {
                    self.halt();
                    self.arrive(now);
                }
                return Ok(());
            }
        }
        if self.mode == DriveMode::TimedStep {
            self.timers.schedule(TimerCategory::Step, self.timing.step, now);
        }
        Ok(())
    }

    /// A failed drive stops the car and drops the command. Idle wandering is
    /// re-armed so the car is not left without timers.
    fn drive(&mut self, dir: MotorState, now: Instant) -> Result<()> {
        if self.motor == dir {
            return Ok(());
        }
        let res = match dir {
            MotorState::MovingUp => self.actuator.drive_up(),
            MotorState::MovingDown => self.actuator.drive_down(),
            MotorState::Stopped => self.actuator.stop(),
        };
        match res {
            Ok(()) => {
                tracing::debug!(from = self.motor.name(), to = dir.name(), "motor");
                self.motor = dir;
                Ok(())
            }
            Err(e) => {
                let err = map_hw_error(e.as_ref());
                tracing::error!(error = %err, direction = dir.name(), "drive failed, stopping car");
                self.timers.cancel_category(TimerCategory::Step);
                if let Err(stop_err) = self.actuator.stop() {
                    tracing::error!(error = %map_hw_error(stop_err.as_ref()), "stop after drive failure failed");
                }
                self.motor = MotorState::Stopped;
                self.destination = None;
                if self.origin.take() != Some(CommandOrigin::IdleWander) {
                    self.idle.arm(&mut self.timers, now);
                }
                Err(err.into())
            }
        }
    }

    fn halt(&mut self) {
        if !self.motor.is_moving() {
            return;
        }
        if let Err(e) = self.actuator.stop() {
            tracing::error!(error = %map_hw_error(e.as_ref()), "stop failed");
        }
        tracing::debug!(from = self.motor.name(), "motor stopped");
        self.motor = MotorState::Stopped;
    }

    fn check_stop(&mut self, now: Instant) {
        let Some(dest) = self.destination else {
            return;
        };
        let reached = match self.motor {
            MotorState::MovingUp => self.current >= dest,
            MotorState::MovingDown => self.current <= dest,
            MotorState::Stopped => false,
        };
        if reached {
            self.arm_stop_lag(now);
        }
    }

    fn arm_stop_lag(&mut self, now: Instant) {
        if self.timers.live_in(TimerCategory::Step) > 0 {
            return;
        }
        tracing::debug!(
            floor = self.current,
            lag_ms = self.timing.lag.as_millis() as u64,
            "destination reached, stopping after lag"
        );
        self.timers.schedule(TimerCategory::Step, self.timing.lag, now);
    }

    fn on_timer(&mut self, fired: Fired) -> Result<()> {
        match fired.handle.category() {
            TimerCategory::Step => match self.mode {
                DriveMode::TimedStep => self.step_once(fired.at),
                DriveMode::Feedback => {
                    self.halt();
                    self.arrive(fired.at);
                    Ok(())
                }
            },
            TimerCategory::Idle => self.wander(fired.at),
            TimerCategory::EndOfRide => {
                tracing::info!(floor = self.current, "ride complete");
                self.publish(Notification::RideComplete);
                self.idle.arm(&mut self.timers, fired.at);
                Ok(())
            }
        }
    }

    fn step_once(&mut self, at: Instant) -> Result<()> {
        let Some(dest) = self.destination else {
            tracing::warn!("step timer fired without a destination");
            return Ok(());
        };
        let prev = self.current;
        let next = match dest.cmp(&prev) {
            Ordering::Greater => prev + 1,
            Ordering::Less => prev - 1,
            Ordering::Equal => prev,
        };
        if next != prev {
            self.current = next;
            tracing::info!(floor = next, "... floor");
            self.show_floor(prev, false);
            self.show_floor(next, true);
        }
        if next == dest {
            self.halt();
            self.arrive(at);
        } else {
            self.timers.schedule(TimerCategory::Step, self.timing.step, at);
        }
        Ok(())
    }

    fn wander(&mut self, at: Instant) -> Result<()> {
        let floor = self.idle.pick_floor(self.lift.floors);
        tracing::debug!(floor, "idle wander");
        self.go_to(
            MotionCommand {
                floor: i64::from(floor),
                origin: CommandOrigin::IdleWander,
            },
            at,
        )
    }

    fn arrive(&mut self, at: Instant) {
        let origin = self.origin.take();
        self.destination = None;
        tracing::info!(
            floor = self.current,
            origin = origin.map(|o| o.name()).unwrap_or("none"),
            "arrived"
        );
        match origin {
            Some(CommandOrigin::External | CommandOrigin::Manual) => {
                self.timers.cancel_category(TimerCategory::EndOfRide);
                self.timers
                    .schedule(TimerCategory::EndOfRide, self.timing.end_of_ride, at);
            }
            Some(CommandOrigin::RiderApproach) => {
                tracing::info!("take picture");
                self.publish(Notification::MotionDetected);
                self.idle.arm(&mut self.timers, at);
            }
            Some(CommandOrigin::IdleWander) | None => {}
        }
    }

    fn show_floor(&mut self, floor: u8, on: bool) {
        match self.mode {
            DriveMode::TimedStep => {
                if let Err(e) = self.actuator.set_indicator(floor, on) {
                    tracing::warn!(error = %e, floor, on, "indicator write failed");
                }
                self.publish(Notification::FloorIndicatorChanged { floor, on });
            }
            DriveMode::Feedback => {
                if on {
                    self.publish(Notification::CurrentFloorChanged { floor });
                }
            }
        }
    }

    fn publish(&mut self, n: Notification) {
        if let Err(e) = self.notifier.notify(n) {
            tracing::warn!(error = %e, notification = n.name(), "notification failed");
        }
    }
}
