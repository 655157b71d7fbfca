use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("no indicator for floor {0}")]
    NoSuchIndicator(u8),
    #[error("motor lines up and down both asserted")]
    Interlock,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
