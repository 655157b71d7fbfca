//! Registry of named, cancelable delayed and periodic actions.
//!
//! Nothing here runs callbacks or sleeps. The owner asks for the next
//! deadline, waits however it likes, then pops due firings one at a time so
//! that handling one firing can still cancel the others before they run.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerCategory {
    /// Movement pacing: the next floor step (timed mode) or the stop lag (feedback mode).
    Step,
    /// Periodic idle wander.
    Idle,
    /// Hold after a ride before reporting completion.
    EndOfRide,
}

impl TimerCategory {
    pub fn name(&self) -> &'static str {
        match self {
            TimerCategory::Step => "step",
            TimerCategory::Idle => "idle",
            TimerCategory::EndOfRide => "end_of_ride",
        }
    }
}

/// Opaque reference to a scheduled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle {
    id: u64,
    category: TimerCategory,
}

impl TimerHandle {
    pub fn category(&self) -> TimerCategory {
        self.category
    }
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: TimerHandle,
    /// The deadline it was scheduled for (never later than the poll time).
    pub at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    category: TimerCategory,
    deadline: Instant,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct TimerRegistry {
    next_id: u64,
    live: BTreeMap<u64, Entry>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot action `delay` after `now`.
    pub fn schedule(&mut self, category: TimerCategory, delay: Duration, now: Instant) -> TimerHandle {
        self.insert(category, now + delay, None)
    }

    /// Arm a periodic action; the first firing is one `period` after `now`.
    pub fn schedule_repeating(
        &mut self,
        category: TimerCategory,
        period: Duration,
        now: Instant,
    ) -> TimerHandle {
        // A zero period would fire forever within a single poll.
        let period = period.max(Duration::from_millis(1));
        self.insert(category, now + period, Some(period))
    }

    fn insert(
        &mut self,
        category: TimerCategory,
        deadline: Instant,
        period: Option<Duration>,
    ) -> TimerHandle {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.live.insert(
            id,
            Entry {
                category,
                deadline,
                period,
            },
        );
        tracing::trace!(id, category = category.name(), "timer armed");
        TimerHandle { id, category }
    }

    /// Cancel one handle. Returns whether it was still live; canceling a
    /// fired or already-canceled handle is a no-op.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let removed = self.live.remove(&handle.id).is_some();
        if removed {
            tracing::trace!(id = handle.id, category = handle.category.name(), "timer cancelled");
        }
        removed
    }

    /// Cancel every live handle of `category`; returns how many were live.
    pub fn cancel_category(&mut self, category: TimerCategory) -> usize {
        let before = self.live.len();
        self.live.retain(|_, e| e.category != category);
        let n = before - self.live.len();
        if n > 0 {
            tracing::debug!(category = category.name(), cancelled = n, "timers cancelled");
        }
        n
    }

    /// Cancel everything; returns how many were live.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.live.len();
        self.live.clear();
        if n > 0 {
            tracing::debug!(cancelled = n, "all timers cancelled");
        }
        n
    }

    pub fn is_live(&self, handle: TimerHandle) -> bool {
        self.live.contains_key(&handle.id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_in(&self, category: TimerCategory) -> usize {
        self.live.values().filter(|e| e.category == category).count()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.live.values().map(|e| e.deadline).min()
    }

    /// Take the earliest firing due at or before `now`.
    ///
    /// One-shot handles are removed; periodic handles move to their next
    /// deadline (and may come due again in the same poll if `now` is far ahead).
    pub fn pop_due(&mut self, now: Instant) -> Option<Fired> {
        let (id, entry) = self
            .live
            .iter()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(id, e)| (e.deadline, **id))
            .map(|(id, e)| (*id, *e))?;
        let handle = TimerHandle {
            id,
            category: entry.category,
        };
        match entry.period {
            Some(period) => {
                if let Some(e) = self.live.get_mut(&id) {
                    e.deadline = entry.deadline + period;
                }
            }
            None => {
                self.live.remove(&id);
            }
        }
        Some(Fired {
            handle,
            at: entry.deadline,
        })
    }
}
