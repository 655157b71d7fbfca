//! Capability traits shared by the lift controller and its backends.
//!
//! The controller only ever talks to the car through [`Actuator`] and to the
//! outside world through [`Notifier`]; both use boxed errors at the boundary
//! so hardware and simulated backends can report whatever they like.

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Drives the car and its floor indicators.
///
/// Timed-step backends treat the drive calls as no-ops and only light
/// indicators; feedback backends assert direction outputs and ignore
/// indicators.
pub trait Actuator {
    fn drive_up(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn drive_down(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn set_indicator(
        &mut self,
        floor: u8,
        on: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn drive_up(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).drive_up()
    }
    fn drive_down(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).drive_down()
    }
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).stop()
    }
    fn set_indicator(
        &mut self,
        floor: u8,
        on: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_indicator(floor, on)
    }
}

/// Outbound events published by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// A floor indicator was switched (timed-step mode).
    FloorIndicatorChanged { floor: u8, on: bool },
    /// A floor sensor confirmed the car's position (feedback mode).
    CurrentFloorChanged { floor: u8 },
    /// The end-of-ride hold elapsed.
    RideComplete,
    /// The car reached the ground floor after a rider approached; the
    /// photo collaborator listens for this.
    MotionDetected,
}

impl Notification {
    /// Stable name used in logs and JSON output.
    pub fn name(&self) -> &'static str {
        match self {
            Notification::FloorIndicatorChanged { .. } => "FloorIndicatorChanged",
            Notification::CurrentFloorChanged { .. } => "CurrentFloorChanged",
            Notification::RideComplete => "RideComplete",
            Notification::MotionDetected => "MotionDetected",
        }
    }
}

/// Receives controller notifications. Failures are logged by the caller and
/// never feed back into motion decisions.
pub trait Notifier {
    fn notify(
        &mut self,
        notification: Notification,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(
        &mut self,
        notification: Notification,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).notify(notification)
    }
}
