//! Test and helper mocks for lift_core

use std::sync::{Arc, Mutex};

use lift_traits::{Actuator, Notification, Notifier};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One call made on an actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    DriveUp,
    DriveDown,
    Stop,
    Indicator { floor: u8, on: bool },
}

/// Records every call; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    log: Arc<Mutex<Vec<ActuatorCall>>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.log.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Indicator writes only, in order.
    pub fn indicator_writes(&self) -> Vec<(u8, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ActuatorCall::Indicator { floor, on } => Some((floor, on)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut g) = self.log.lock() {
            g.clear();
        }
    }

    fn push(&self, call: ActuatorCall) {
        if let Ok(mut g) = self.log.lock() {
            g.push(call);
        }
    }
}

impl Actuator for RecordingActuator {
    fn drive_up(&mut self) -> Result<(), BoxError> {
        self.push(ActuatorCall::DriveUp);
        Ok(())
    }
    fn drive_down(&mut self) -> Result<(), BoxError> {
        self.push(ActuatorCall::DriveDown);
        Ok(())
    }
    fn stop(&mut self) -> Result<(), BoxError> {
        self.push(ActuatorCall::Stop);
        Ok(())
    }
    fn set_indicator(&mut self, floor: u8, on: bool) -> Result<(), BoxError> {
        self.push(ActuatorCall::Indicator { floor, on });
        Ok(())
    }
}

/// Drive commands always fail; `stop` and indicators succeed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingActuator;

impl Actuator for FailingActuator {
    fn drive_up(&mut self) -> Result<(), BoxError> {
        Err(Box::new(std::io::Error::other("drive up failed")))
    }
    fn drive_down(&mut self) -> Result<(), BoxError> {
        Err(Box::new(std::io::Error::other("drive down failed")))
    }
    fn stop(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
    fn set_indicator(&mut self, _floor: u8, _on: bool) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Fails the first `n` drive commands, then behaves like `RecordingActuator`.
#[derive(Debug, Clone)]
pub struct FlakyActuator {
    inner: RecordingActuator,
    failures_left: Arc<Mutex<usize>>,
}

impl FlakyActuator {
    pub fn new(n: usize) -> Self {
        Self {
            inner: RecordingActuator::new(),
            failures_left: Arc::new(Mutex::new(n)),
        }
    }

    /// Log of the calls that went through.
    pub fn recorder(&self) -> RecordingActuator {
        self.inner.clone()
    }

    fn take_failure(&self) -> bool {
        match self.failures_left.lock() {
            Ok(mut left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        }
    }
}

impl Actuator for FlakyActuator {
    fn drive_up(&mut self) -> Result<(), BoxError> {
        if self.take_failure() {
            return Err(Box::new(std::io::Error::other("drive up failed")));
        }
        self.inner.drive_up()
    }
    fn drive_down(&mut self) -> Result<(), BoxError> {
        if self.take_failure() {
            return Err(Box::new(std::io::Error::other("drive down failed")));
        }
        self.inner.drive_down()
    }
    fn stop(&mut self) -> Result<(), BoxError> {
        self.inner.stop()
    }
    fn set_indicator(&mut self, floor: u8, on: bool) -> Result<(), BoxError> {
        self.inner.set_indicator(floor, on)
    }
}

/// Records every notification; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Notification> {
        self.log.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn count(&self, pred: impl Fn(&Notification) -> bool) -> usize {
        self.events().iter().filter(|n| pred(n)).count()
    }

    pub fn clear(&self) {
        if let Ok(mut g) = self.log.lock() {
            g.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notification: Notification) -> Result<(), BoxError> {
        if let Ok(mut g) = self.log.lock() {
            g.push(notification);
        }
        Ok(())
    }
}

/// Every publish fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&mut self, _notification: Notification) -> Result<(), BoxError> {
        Err(Box::new(std::io::Error::other("bus unavailable")))
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&mut self, _notification: Notification) -> Result<(), BoxError> {
        Ok(())
    }
}
