mod common;

use common::{no_idle, seeded_idle, Rig};
use lift_core::mocks::ActuatorCall;
use lift_core::{CommandOrigin, DriveMode, TimerCategory};
use lift_traits::Notification;
use rstest::rstest;

fn detected(rig: &Rig) -> usize {
    rig.notifier.count(|n| *n == Notification::MotionDetected)
}

#[rstest]
fn rider_mid_ride_returns_to_ground_and_requests_capture() {
    let mut rig = Rig::new(DriveMode::TimedStep, no_idle(), 1);
    rig.lift
        .go_to_floor(6, CommandOrigin::External, rig.at(0))
        .unwrap();
    rig.run_to(2500);
    assert_eq!(rig.lift.current_floor(), 3);

    rig.lift.rider_approaching(rig.at(2500)).unwrap();
    assert_eq!(rig.lift.destination(), Some(1));
    assert_eq!(rig.actuator.calls().last(), Some(&ActuatorCall::DriveDown));

    rig.run_to(3499);
    assert_eq!(detected(&rig), 0);
    rig.run_to(4500);
    assert_eq!(rig.lift.current_floor(), 1);
    assert_eq!(detected(&rig), 1);
    assert_eq!(rig.notifier.events().last(), Some(&Notification::MotionDetected));
    assert_eq!(rig.lift.live_timers(), 0);

    rig.run_to(60_000);
    assert_eq!(rig.notifier.count(|n| *n == Notification::RideComplete), 0);
}

#[rstest]
fn rider_during_end_of_ride_hold_cancels_completion() {
    let mut rig = Rig::new(DriveMode::TimedStep, no_idle(), 1);
    rig.lift
        .go_to_floor(3, CommandOrigin::Manual, rig.at(0))
        .unwrap();
    rig.run_to(2000);
    assert_eq!(rig.lift.live_timers_in(TimerCategory::EndOfRide), 1);

    rig.lift.rider_approaching(rig.at(5000)).unwrap();
    assert_eq!(rig.lift.live_timers_in(TimerCategory::EndOfRide), 0);
    rig.run_to(30_000);
    assert_eq!(rig.lift.current_floor(), 1);
    assert_eq!(detected(&rig), 1);
    assert_eq!(rig.notifier.count(|n| *n == Notification::RideComplete), 0);
}

#[rstest]
fn rider_at_ground_floor_is_captured_immediately() {
    let mut rig = Rig::new(DriveMode::TimedStep, no_idle(), 1);
    rig.actuator.clear();
    rig.lift.on_motion_sensor(rig.at(0)).unwrap();
    assert_eq!(detected(&rig), 1);
    assert!(rig.actuator.calls().is_empty());
}

#[rstest]
fn idle_resumes_right_after_capture() {
    let mut rig = Rig::new(DriveMode::TimedStep, seeded_idle(3), 2);
    rig.lift.rider_approaching(rig.at(100)).unwrap();
    assert!(!rig.lift.idle_armed());
    rig.run_to(1100);
    assert_eq!(detected(&rig), 1);
    assert!(rig.lift.idle_armed());
    assert_eq!(rig.lift.live_timers(), 1);
}

#[rstest]
fn feedback_rider_stops_after_lag_at_ground() {
    let mut rig = Rig::new(DriveMode::Feedback, no_idle(), 3);
    rig.lift.on_motion_sensor(rig.at(0)).unwrap();
    rig.lift.on_floor_sensor(2, rig.at(1000));
    rig.lift.on_floor_sensor(1, rig.at(2000));
    rig.run_to(2499);
    assert_eq!(detected(&rig), 0);
    rig.run_to(2500);
    assert_eq!(detected(&rig), 1);
    assert!(rig.lift.status().at_rest());
}
