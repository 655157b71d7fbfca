use std::thread;
use std::time::Duration;

use crossbeam_channel::unbounded;
use lift_core::mocks::{RecordingActuator, RecordingNotifier};
use lift_core::{
    build_controller, CommandOrigin, DriveMode, Event, IdleCfg, LiftCfg, Runner, SensorMap,
    TimingCfg,
};
use lift_traits::{Clock, ManualClock, MonotonicClock, Notification};
use rstest::rstest;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn timing() -> TimingCfg {
    TimingCfg {
        step: ms(1000),
        lag: ms(500),
        end_of_ride: ms(15_000),
        idle_period: ms(20_000),
        debounce: ms(50),
    }
}

fn no_idle() -> IdleCfg {
    IdleCfg {
        enabled: false,
        seed: None,
    }
}

/// Floors 1..=8 on channels 10..=17, motion detector on 20.
fn sensor_map() -> SensorMap {
    SensorMap::new(&[10, 11, 12, 13, 14, 15, 16, 17], Some(20)).unwrap()
}

type ManualRunner = Runner<RecordingActuator, RecordingNotifier, ManualClock>;

fn manual_runner(mode: DriveMode, boot_floor: u8) -> (ManualRunner, ManualClock, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let controller = build_controller(
        RecordingActuator::new(),
        notifier.clone(),
        LiftCfg {
            floors: 8,
            boot_floor,
            ground_floor: 1,
        },
        timing(),
        mode,
        no_idle(),
    )
    .unwrap();
    let clock = ManualClock::new();
    let mut runner = Runner::new(controller, sensor_map(), clock.clone());
    runner.start();
    (runner, clock, notifier)
}

fn edge(channel: u8, level: bool) -> Event {
    Event::SensorEdge { channel, level }
}

#[rstest]
fn floor_edge_counts_only_after_debounce_window() {
    let (mut runner, clock, _) = manual_runner(DriveMode::Feedback, 1);
    runner
        .handle(Event::GoTo {
            floor: 3,
            origin: CommandOrigin::Manual,
        })
        .unwrap();
    runner.handle(edge(11, true)).unwrap();

    clock.advance(ms(49));
    runner.tick();
    assert_eq!(runner.status().floor, 1);

    clock.advance(ms(1));
    runner.tick();
    assert_eq!(runner.status().floor, 2);
}

#[rstest]
fn chatter_faster_than_window_never_confirms() {
    let (mut runner, clock, notifier) = manual_runner(DriveMode::Feedback, 1);
    for level in [true, false, true, false, true, false] {
        runner.handle(edge(12, level)).unwrap();
        clock.advance(ms(20));
        runner.tick();
    }
    clock.advance(ms(500));
    runner.tick();
    assert_eq!(runner.status().floor, 1);
    assert_eq!(
        notifier.count(|n| matches!(n, Notification::CurrentFloorChanged { floor: 3 })),
        0
    );
}

#[rstest]
fn sensor_release_is_not_an_arrival() {
    let (mut runner, clock, notifier) = manual_runner(DriveMode::Feedback, 1);
    runner.handle(edge(11, true)).unwrap();
    clock.advance(ms(50));
    runner.tick();
    let seen = notifier.events().len();

    runner.handle(edge(11, false)).unwrap();
    clock.advance(ms(50));
    runner.tick();
    assert_eq!(notifier.events().len(), seen);
    assert_eq!(runner.status().floor, 2);
}

#[rstest]
fn destination_edge_then_lag_stops_the_car() {
    let (mut runner, clock, _) = manual_runner(DriveMode::Feedback, 1);
    runner
        .handle(Event::GoTo {
            floor: 2,
            origin: CommandOrigin::Manual,
        })
        .unwrap();
    clock.advance(ms(900));
    runner.handle(edge(11, true)).unwrap();
    // Confirmation at +50 ms, stop lag 500 ms after that.
    clock.advance(ms(549));
    runner.tick();
    assert!(runner.status().motor.is_moving());
    clock.advance(ms(1));
    runner.tick();
    assert!(runner.status().at_rest());
    assert_eq!(runner.status().floor, 2);
}

#[rstest]
fn motion_channel_triggers_rider_approach() {
    let (mut runner, clock, notifier) = manual_runner(DriveMode::TimedStep, 3);
    runner.handle(edge(20, true)).unwrap();
    clock.advance(ms(50));
    runner.tick();
    assert_eq!(runner.status().destination, Some(1));

    clock.advance(ms(2000));
    runner.tick();
    assert_eq!(runner.status().floor, 1);
    assert_eq!(notifier.events().last(), Some(&Notification::MotionDetected));
}

#[rstest]
fn unmapped_channel_is_ignored() {
    let (mut runner, _, _) = manual_runner(DriveMode::Feedback, 1);
    assert!(runner.handle(edge(99, true)).unwrap());
    assert_eq!(runner.next_deadline(), None);
}

#[rstest]
fn invalid_goto_is_an_error_and_shutdown_stops() {
    let (mut runner, _, _) = manual_runner(DriveMode::TimedStep, 1);
    assert!(
        runner
            .handle(Event::GoTo {
                floor: 42,
                origin: CommandOrigin::External,
            })
            .is_err()
    );
    assert!(!runner.handle(Event::Shutdown).unwrap());
}

#[rstest]
fn next_deadline_is_the_earliest_of_timers_and_debounce() {
    let (mut runner, clock, _) = manual_runner(DriveMode::TimedStep, 1);
    let t = clock.now();
    runner
        .handle(Event::GoTo {
            floor: 2,
            origin: CommandOrigin::Manual,
        })
        .unwrap();
    assert_eq!(runner.next_deadline(), Some(t + ms(1000)));
    runner.handle(edge(20, true)).unwrap();
    assert_eq!(runner.next_deadline(), Some(t + ms(50)));
}

fn fast_timing() -> TimingCfg {
    TimingCfg {
        step: ms(10),
        lag: ms(5),
        end_of_ride: ms(30),
        idle_period: ms(1000),
        debounce: ms(5),
    }
}

#[rstest]
fn run_consumes_channel_until_shutdown() {
    let notifier = RecordingNotifier::new();
    let controller = build_controller(
        RecordingActuator::new(),
        notifier.clone(),
        LiftCfg::default(),
        fast_timing(),
        DriveMode::TimedStep,
        no_idle(),
    )
    .unwrap();
    let mut runner = Runner::new(controller, SensorMap::default(), MonotonicClock::new());
    let (tx, rx) = unbounded();

    let feeder = thread::spawn(move || {
        tx.send(Event::GoTo {
            floor: 3,
            origin: CommandOrigin::External,
        })
        .unwrap();
        thread::sleep(Duration::from_millis(300));
        tx.send(Event::Shutdown).unwrap();
    });

    let status = runner.run(&rx);
    feeder.join().unwrap();

    assert_eq!(status.floor, 3);
    assert_eq!(status.live_timers, 0);
    assert_eq!(notifier.count(|n| *n == Notification::RideComplete), 1);
}

#[rstest]
fn run_until_stops_when_predicate_holds() {
    let controller = build_controller(
        RecordingActuator::new(),
        RecordingNotifier::new(),
        LiftCfg::default(),
        fast_timing(),
        DriveMode::TimedStep,
        no_idle(),
    )
    .unwrap();
    let mut runner = Runner::new(controller, SensorMap::default(), MonotonicClock::new());
    let (tx, rx) = unbounded();
    tx.send(Event::GoTo {
        floor: 4,
        origin: CommandOrigin::Manual,
    })
    .unwrap();

    let status = runner.run_until(&rx, |s| s.floor == 4 && s.at_rest());
    assert_eq!(status.floor, 4);
    drop(tx);
}
