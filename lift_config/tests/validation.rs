use lift_config::{DriveMode, load_file, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

const FEEDBACK_CAR: &str = r#"
[floors]
count = 4
boot_floor = 1
ground_floor = 1

[drive]
mode = "feedback"

[timing]
step_ms = 1000
lag_ms = 500
end_of_ride_ms = 10000
idle_period_ms = 30000
debounce_ms = 40

[pins]
indicators = []
motor_up = 20
motor_down = 21
floor_sensors = [4, 17, 27, 22]
motion_sensor = 18

[sensors]
active_low = true
"#;

#[test]
fn parses_feedback_car() {
    let cfg = load_toml(FEEDBACK_CAR).expect("parse TOML");
    cfg.validate().expect("valid config");
    assert_eq!(cfg.drive.mode, DriveMode::Feedback);
    assert_eq!(cfg.floors.count, 4);
    assert_eq!(cfg.timing.debounce_ms, 40);
    assert!(cfg.has_feedback_pins());
}

#[rstest]
#[case("[floors]\ncount = 0\n", "floors.count must be >= 1")]
#[case(
    "[floors]\ncount = 8\nboot_floor = 9\n",
    "floors.boot_floor must be in [1, 8]"
)]
#[case(
    "[floors]\ncount = 8\nground_floor = 0\n",
    "floors.ground_floor must be in [1, 8]"
)]
#[case("[timing]\nstep_ms = 0\n", "timing.step_ms must be >= 1")]
#[case("[timing]\nlag_ms = 0\n", "timing.lag_ms must be >= 1")]
#[case("[timing]\ndebounce_ms = 0\n", "timing.debounce_ms must be >= 1")]
#[case("[timing]\nidle_period_ms = 10\n", "timing.idle_period_ms must be >= 1000")]
#[case("[pins]\nindicators = [3, 5]\n", "pins.indicators must list one pin per floor")]
#[case(
    "[pins]\nfloor_sensors = [1, 2, 3, 4, 5, 6, 7, 7]\n",
    "sensor pin 7 is assigned twice"
)]
#[case(
    "[pins]\nfloor_sensors = [1, 2, 3, 4, 5, 6, 7, 8]\nmotion_sensor = 8\n",
    "sensor pin 8 is assigned twice"
)]
#[case(
    "[pins]\nmotor_up = 20\nmotor_down = 20\n",
    "pins.motor_up and pins.motor_down must differ"
)]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "error {err} does not mention {needle}"
    );
}

#[test]
fn unknown_drive_mode_is_a_parse_error() {
    let err = load_toml("[drive]\nmode = \"teleport\"\n").expect_err("bad mode");
    assert!(format!("{err}").contains("teleport"));
}

#[test]
fn load_file_reads_and_validates() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.toml");
    fs::write(&good, FEEDBACK_CAR).unwrap();
    let cfg = load_file(&good).expect("load good config");
    assert_eq!(cfg.pins.motion_sensor, Some(18));

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[floors]\ncount = 0\n").unwrap();
    let err = load_file(&bad).expect_err("invalid config");
    assert!(format!("{err}").contains("floors.count"));

    let missing = dir.path().join("missing.toml");
    let err = load_file(&missing).expect_err("missing file");
    assert!(format!("{err}").contains("read config"));
}
