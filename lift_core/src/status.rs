//! Motor state, command origins and the status snapshot.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorState {
    #[default]
    Stopped,
    MovingUp,
    MovingDown,
}

impl MotorState {
    pub fn name(&self) -> &'static str {
        match self {
            MotorState::Stopped => "stopped",
            MotorState::MovingUp => "moving_up",
            MotorState::MovingDown => "moving_down",
        }
    }

    pub fn is_moving(&self) -> bool {
        !matches!(self, MotorState::Stopped)
    }
}

/// Where a go-to-floor request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOrigin {
    /// Remote event bus.
    External,
    /// Operator or test call.
    Manual,
    /// Idle scheduler tick.
    IdleWander,
    /// Motion detector / rider approach: ends with a capture notification.
    RiderApproach,
}

impl CommandOrigin {
    pub fn name(&self) -> &'static str {
        match self {
            CommandOrigin::External => "external",
            CommandOrigin::Manual => "manual",
            CommandOrigin::IdleWander => "idle",
            CommandOrigin::RiderApproach => "rider",
        }
    }
}

/// A request to go to `floor`. The floor is unchecked until the controller accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionCommand {
    pub floor: i64,
    pub origin: CommandOrigin,
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiftStatus {
    pub floor: u8,
    pub destination: Option<u8>,
    pub motor: MotorState,
    pub live_timers: usize,
    pub idle_armed: bool,
}

impl LiftStatus {
    /// Stopped with nothing left to do for the current command.
    pub fn at_rest(&self) -> bool {
        self.motor == MotorState::Stopped && self.destination.is_none()
    }
}
