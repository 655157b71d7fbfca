//! Single-threaded event loop around a `Controller`.
//!
//! Everything that touches controller state happens on the thread that owns
//! the `Runner`. Other threads (stdin reader, GPIO interrupt handlers,
//! Ctrl-C) only send `Event`s over a channel. Between events the loop waits
//! until the earliest timer or debounce deadline.

use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::Instant;

use lift_traits::{Actuator, Clock, Notifier};

use crate::command::Event;
use crate::controller::Controller;
use crate::debounce::{Confirmed, Debouncer};
use crate::error::Result;
use crate::sensors::{SensorMap, SensorRole};
use crate::status::{LiftStatus, MotionCommand};

pub struct Runner<A: Actuator, N: Notifier, C: Clock> {
    controller: Controller<A, N>,
    debouncer: Debouncer,
    sensors: SensorMap,
    clock: C,
}

impl<A: Actuator, N: Notifier, C: Clock> Runner<A, N, C> {
    pub fn new(controller: Controller<A, N>, sensors: SensorMap, clock: C) -> Self {
        let mut debouncer = Debouncer::new(controller.timing.debounce);
        for ch in sensors.channels() {
            debouncer.set_stable(ch, false);
        }
        Self {
            controller,
            debouncer,
            sensors,
            clock,
        }
    }

    pub fn status(&self) -> LiftStatus {
        self.controller.status()
    }

    pub fn start(&mut self) {
        let now = self.clock.now();
        self.controller.start(now);
    }

    /// Apply one event. Returns `Ok(false)` when the loop should stop.
    pub fn handle(&mut self, event: Event) -> Result<bool> {
        let now = self.clock.now();
        match event {
            Event::GoTo { floor, origin } => {
                self.controller.go_to(MotionCommand { floor, origin }, now)?;
            }
            Event::RiderApproaching => self.controller.rider_approaching(now)?,
            Event::SensorEdge { channel, level } => {
                if self.sensors.role(channel).is_none() {
                    tracing::warn!(channel, level, "edge on unmapped sensor channel");
                } else {
                    self.debouncer.observe(channel, level, now);
                }
            }
            Event::Shutdown => return Ok(false),
        }
        Ok(true)
    }

    /// Earliest instant something is due: a timer or a debounce window.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debouncer.next_deadline(), self.controller.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Process everything due by the clock's current time, in time order.
    ///
    /// Returns how many confirmations and timer firings were handled.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut handled = 0;
        loop {
            let edge = self.debouncer.next_deadline().filter(|d| *d <= now);
            let timer = self.controller.next_deadline().filter(|d| *d <= now);
            let take_timer = match (edge, timer) {
                (None, None) => break,
                (Some(e), Some(t)) => t < e,
                (None, Some(_)) => true,
                (Some(_), None) => false,
            };
            if take_timer {
                if let Some(Err(e)) = self.controller.fire_next_due(now) {
                    tracing::warn!(error = %e, "timer action failed");
                }
            } else if let Some(c) = self.debouncer.pop_confirmed(now) {
                self.dispatch(c);
            }
            handled += 1;
        }
        handled
    }

    fn dispatch(&mut self, c: Confirmed) {
        if !c.level {
            tracing::trace!(channel = c.channel, "sensor released");
            return;
        }
        match self.sensors.role(c.channel) {
            Some(SensorRole::Floor(floor)) => self.controller.on_floor_sensor(floor, c.at),
            Some(SensorRole::Motion) => {
                if let Err(e) = self.controller.on_motion_sensor(c.at) {
                    tracing::warn!(error = %e, "rider approach failed");
                }
            }
            None => tracing::warn!(channel = c.channel, "confirmed edge on unmapped channel"),
        }
    }

    /// Run until `Shutdown` or until every sender is dropped.
    pub fn run(&mut self, rx: &Receiver<Event>) -> LiftStatus {
        self.run_until(rx, |_| false)
    }

    /// Run until `done` holds after a tick, `Shutdown` arrives or the
    /// channel disconnects. The controller is shut down before returning.
    ///
    /// Waits use the real clock, so this is meant for `MonotonicClock`.
    pub fn run_until<F>(&mut self, rx: &Receiver<Event>, mut done: F) -> LiftStatus
    where
        F: FnMut(&LiftStatus) -> bool,
    {
        self.start();
        loop {
            self.tick();
            if done(&self.controller.status()) {
                break;
            }
            let msg = match self.next_deadline() {
                Some(deadline) => rx.recv_deadline(deadline),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match msg {
                Ok(event) => match self.handle(event) {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::info!("shutdown requested");
                        break;
                    }
                    Err(e) => tracing::warn!(error = %e, "command failed"),
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::info!("input closed");
                    break;
                }
            }
        }
        self.controller.shutdown();
        self.controller.status()
    }
}
