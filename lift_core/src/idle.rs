//! Idle wandering: a periodic timer that picks a random floor.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::timers::{TimerCategory, TimerHandle, TimerRegistry};

#[derive(Debug)]
pub struct IdleScheduler {
    enabled: bool,
    period: Duration,
    rng: StdRng,
    handle: Option<TimerHandle>,
}

impl IdleScheduler {
    pub fn new(enabled: bool, period: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            enabled,
            period,
            rng,
            handle: None,
        }
    }

    /// Start wandering unless already armed (or disabled).
    pub fn arm(&mut self, timers: &mut TimerRegistry, now: Instant) {
        if !self.enabled || self.is_armed(timers) {
            return;
        }
        let h = timers.schedule_repeating(TimerCategory::Idle, self.period, now);
        tracing::debug!(period_ms = self.period.as_millis() as u64, "idle wander armed");
        self.handle = Some(h);
    }

    /// Stop wandering; safe to call when not armed.
    pub fn disarm(&mut self, timers: &mut TimerRegistry) {
        if let Some(h) = self.handle.take()
            && timers.cancel(h)
        {
            tracing::debug!("idle wander disarmed");
        }
    }

    pub fn is_armed(&self, timers: &TimerRegistry) -> bool {
        self.handle.is_some_and(|h| timers.is_live(h))
    }

    /// Uniform pick from `1..=floors`; the current floor is allowed.
    pub fn pick_floor(&mut self, floors: u8) -> u8 {
        self.rng.gen_range(1..=floors.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_and_disarm_are_idempotent() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let mut idle = IdleScheduler::new(true, Duration::from_secs(20), Some(1));
        idle.arm(&mut timers, t0);
        idle.arm(&mut timers, t0);
        assert_eq!(timers.live_in(TimerCategory::Idle), 1);
        idle.disarm(&mut timers);
        idle.disarm(&mut timers);
        assert_eq!(timers.live_count(), 0);
        assert!(!idle.is_armed(&timers));
    }

    #[test]
    fn rearms_after_bulk_cancel() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let mut idle = IdleScheduler::new(true, Duration::from_secs(20), Some(1));
        idle.arm(&mut timers, t0);
        timers.cancel_all();
        assert!(!idle.is_armed(&timers));
        idle.arm(&mut timers, t0);
        assert!(idle.is_armed(&timers));
    }

    #[test]
    fn disabled_never_arms() {
        let mut timers = TimerRegistry::new();
        let mut idle = IdleScheduler::new(false, Duration::from_secs(20), None);
        idle.arm(&mut timers, Instant::now());
        assert_eq!(timers.live_count(), 0);
    }

    #[test]
    fn picks_stay_in_range_and_cover_all_floors() {
        let mut idle = IdleScheduler::new(true, Duration::from_secs(20), Some(42));
        let mut seen = [false; 8];
        for _ in 0..500 {
            let f = idle.pick_floor(8);
            assert!((1..=8).contains(&f));
            seen[usize::from(f - 1)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = IdleScheduler::new(true, Duration::from_secs(1), Some(7));
        let mut b = IdleScheduler::new(true, Duration::from_secs(1), Some(7));
        let xs: Vec<u8> = (0..16).map(|_| a.pick_floor(8)).collect();
        let ys: Vec<u8> = (0..16).map(|_| b.pick_floor(8)).collect();
        assert_eq!(xs, ys);
    }
}
