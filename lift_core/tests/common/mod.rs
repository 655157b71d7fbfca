#![allow(dead_code)]

use std::time::{Duration, Instant};

use lift_core::mocks::{RecordingActuator, RecordingNotifier};
use lift_core::{build_controller, Controller, DriveMode, IdleCfg, LiftCfg, TimingCfg};

pub type TestLift = Controller<RecordingActuator, RecordingNotifier>;

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn timing() -> TimingCfg {
    TimingCfg {
        step: ms(1000),
        lag: ms(500),
        end_of_ride: ms(15_000),
        idle_period: ms(20_000),
        debounce: ms(50),
    }
}

pub fn no_idle() -> IdleCfg {
    IdleCfg {
        enabled: false,
        seed: None,
    }
}

pub fn seeded_idle(seed: u64) -> IdleCfg {
    IdleCfg {
        enabled: true,
        seed: Some(seed),
    }
}

pub struct Rig {
    pub lift: TestLift,
    pub actuator: RecordingActuator,
    pub notifier: RecordingNotifier,
    pub t0: Instant,
}

impl Rig {
    pub fn new(mode: DriveMode, idle: IdleCfg, boot_floor: u8) -> Self {
        let actuator = RecordingActuator::new();
        let notifier = RecordingNotifier::new();
        let lift = build_controller(
            actuator.clone(),
            notifier.clone(),
            LiftCfg {
                floors: 8,
                boot_floor,
                ground_floor: 1,
            },
            timing(),
            mode,
            idle,
        )
        .expect("valid config");
        let t0 = Instant::now();
        let mut rig = Self {
            lift,
            actuator,
            notifier,
            t0,
        };
        rig.lift.start(t0);
        rig
    }

    pub fn at(&self, millis: u64) -> Instant {
        self.t0 + ms(millis)
    }

    /// Run every timer due up to `millis` after start.
    pub fn run_to(&mut self, millis: u64) -> usize {
        let now = self.at(millis);
        self.lift.poll_timers(now)
    }
}
