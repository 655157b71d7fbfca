use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lift_hardware::error::HwError;
use lift_hardware::util::{logical_level, sleep_unless_stopped};
use lift_hardware::{Drive, EdgeSink, ShaftSim, SimulatedMotor, SimulatedStepper};
use lift_traits::Actuator;
use rstest::rstest;

#[rstest]
#[case(true, true, false)]
#[case(false, true, true)]
#[case(true, false, true)]
#[case(false, false, false)]
fn logical_level_honours_polarity(#[case] high: bool, #[case] active_low: bool, #[case] want: bool) {
    assert_eq!(logical_level(high, active_low), want);
}

#[rstest]
fn stepper_rejects_unknown_indicator() {
    let mut s = SimulatedStepper::new(8);
    for floor in [0u8, 9] {
        let err = s.set_indicator(floor, true).expect_err("out of range");
        let hw = err.downcast_ref::<HwError>().expect("typed hardware error");
        assert!(matches!(hw, HwError::NoSuchIndicator(f) if *f == floor));
    }
    assert!(s.lit_floors().is_empty());
}

#[rstest]
fn sleep_returns_early_when_stopped() {
    let stop = std::sync::atomic::AtomicBool::new(true);
    let start = Instant::now();
    assert!(!sleep_unless_stopped(
        &stop,
        Duration::from_secs(5),
        Duration::from_millis(1)
    ));
    assert!(start.elapsed() < Duration::from_secs(1));
}

fn collecting_sink() -> (EdgeSink, Arc<Mutex<Vec<(u8, bool)>>>) {
    let edges = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&edges);
    let sink: EdgeSink = Arc::new(move |ch, level| {
        e.lock().unwrap().push((ch, level));
    });
    (sink, edges)
}

#[rstest]
fn shaft_reports_passing_floors_while_driven() {
    let (sink, edges) = collecting_sink();
    let shaft = ShaftSim {
        floors: 4,
        boot_floor: 1,
        channels: vec![10, 11, 12, 13],
        floor_time: Duration::from_millis(20),
    };
    let mut motor = SimulatedMotor::with_shaft(shaft, sink).unwrap();
    motor.drive_up().unwrap();
    assert_eq!(motor.drive(), Drive::Up);

    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if edges.lock().unwrap().contains(&(13, false)) {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    motor.stop().unwrap();
    drop(motor);

    let seen = edges.lock().unwrap().clone();
    let rising: Vec<u8> = seen.iter().filter(|(_, l)| *l).map(|(c, _)| *c).collect();
    assert_eq!(rising, vec![11, 12, 13]);
}

#[rstest]
fn idle_shaft_reports_nothing() {
    let (sink, edges) = collecting_sink();
    let shaft = ShaftSim {
        floors: 4,
        boot_floor: 2,
        channels: vec![10, 11, 12, 13],
        floor_time: Duration::from_millis(10),
    };
    let motor = SimulatedMotor::with_shaft(shaft, sink).unwrap();
    std::thread::sleep(Duration::from_millis(60));
    drop(motor);
    assert!(edges.lock().unwrap().is_empty());
}
