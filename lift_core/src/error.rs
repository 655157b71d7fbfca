use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("invalid floor {floor}: must be in [1, {floors}]")]
    InvalidFloor { floor: i64, floors: u8 },
    #[error("actuator error: {0}")]
    Actuator(String),
    #[error("actuator fault: {0}")]
    ActuatorFault(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing actuator")]
    MissingActuator,
    #[error("missing notifier")]
    MissingNotifier,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
