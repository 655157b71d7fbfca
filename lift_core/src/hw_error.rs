//! Maps `Box<dyn Error>` from trait boundaries to typed `ControlError`.
//!
//! The traits in `lift_traits` use `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `lift_hardware::HwError`.

use crate::error::ControlError;

/// Map a trait-boundary error to a typed `ControlError`.
///
/// Known hardware error types are downcast first; anything else is carried
/// as a plain actuator error.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> ControlError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<lift_hardware::error::HwError>() {
            return match hw {
                lift_hardware::error::HwError::Io(io) => ControlError::Actuator(io.to_string()),
                other => ControlError::ActuatorFault(other.to_string()),
            };
        }
    }

    ControlError::Actuator(e.to_string())
}
