//! Human-readable error descriptions and structured JSON error formatting.

use lift_core::command::ParseError;
use lift_core::error::{BuildError, ControlError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingActuator => {
                "What happened: No actuator was provided to the controller.\nLikely causes: The drive backend failed to initialize.\nHow to fix: Check the [pins] section and GPIO permissions, or run without the hardware feature.".to_string()
            }
            BuildError::MissingNotifier => {
                "What happened: No notifier was provided to the controller.\nLikely causes: Internal wiring error.\nHow to fix: Re-run with --log-level=debug and report the log.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<ControlError>() {
        return match ce {
            ControlError::InvalidFloor { floor, floors } => format!(
                "What happened: Floor {floor} does not exist.\nLikely causes: The building has floors 1 to {floors}.\nHow to fix: Pick a floor in [1, {floors}]."
            ),
            ControlError::Actuator(msg) | ControlError::ActuatorFault(msg) => format!(
                "What happened: The motor or indicator output failed ({msg}).\nLikely causes: GPIO wiring, permissions, or a pin used by another process.\nHow to fix: Check [pins] and run self-check; the car was stopped."
            ),
            ControlError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing file, bad TOML, or values that fail validation.\nHow to fix: Edit the config file (see etc/lift_config.toml), then rerun."
            ),
        };
    }

    if let Some(pe) = err.downcast_ref::<ParseError>() {
        return format!(
            "What happened: Could not understand the command ({pe}).\nHow to fix: Use `goto <floor>`, `rider`, or an event-bus JSON message."
        );
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 1 generic, 2 invalid command, 3 actuator failure, 4 config error.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ce) = err.downcast_ref::<ControlError>() {
        return match ce {
            ControlError::InvalidFloor { .. } => 2,
            ControlError::Actuator(_) | ControlError::ActuatorFault(_) => 3,
            ControlError::Config(_) => 4,
        };
    }
    if let Some(BuildError::InvalidConfig(_)) = err.downcast_ref::<BuildError>() {
        return 4;
    }
    if err.downcast_ref::<ParseError>().is_some() {
        return 2;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(ce) = err.downcast_ref::<ControlError>() {
        return match ce {
            ControlError::InvalidFloor { .. } => "InvalidFloor",
            ControlError::Actuator(_) => "Actuator",
            ControlError::ActuatorFault(_) => "ActuatorFault",
            ControlError::Config(_) => "Config",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    if err.downcast_ref::<ParseError>().is_some() {
        return "Parse";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    match err.downcast_ref::<ControlError>() {
        Some(ControlError::InvalidFloor { floor, floors }) => json!({
            "reason": reason_name(err),
            "details": { "floor": floor, "floors": floors },
            "message": msg,
        })
        .to_string(),
        _ => json!({ "reason": reason_name(err), "message": msg }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ControlError::InvalidFloor { floor: 9, floors: 8 }, 2)]
    #[case(ControlError::Actuator("x".into()), 3)]
    #[case(ControlError::ActuatorFault("x".into()), 3)]
    #[case(ControlError::Config("x".into()), 4)]
    fn control_errors_map_to_exit_codes(#[case] e: ControlError, #[case] code: i32) {
        assert_eq!(exit_code_for_error(&eyre::Report::new(e)), code);
    }

    #[test]
    fn invalid_floor_json_carries_details() {
        let err = eyre::Report::new(ControlError::InvalidFloor { floor: 0, floors: 8 });
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "InvalidFloor");
        assert_eq!(v["details"]["floors"], 8);
    }

    #[test]
    fn unknown_errors_are_generic() {
        let err = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("boom"));
    }
}
