//! Time-window debouncing of raw sensor edges.
//!
//! Each channel keeps its last confirmed level and at most one pending
//! candidate. A candidate is confirmed once it has held for the whole window;
//! any flip in between restarts (or clears) the candidate, so a channel that
//! chatters faster than the window never confirms anything.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// A level transition that held for the full window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmed {
    pub channel: u8,
    pub level: bool,
    /// Instant the window elapsed.
    pub at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct ChannelState {
    stable: bool,
    pending: Option<(bool, Instant)>,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    channels: BTreeMap<u8, ChannelState>,
}

impl Debouncer {
    /// Channels start out confirmed inactive (`false`).
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            channels: BTreeMap::new(),
        }
    }

    /// Seed a channel's confirmed level without emitting a transition.
    pub fn set_stable(&mut self, channel: u8, level: bool) {
        self.channels.insert(
            channel,
            ChannelState {
                stable: level,
                pending: None,
            },
        );
    }

    /// Last confirmed level, if the channel has been seen.
    pub fn stable_level(&self, channel: u8) -> Option<bool> {
        self.channels.get(&channel).map(|s| s.stable)
    }

    /// Record a raw level observed at `at`.
    pub fn observe(&mut self, channel: u8, level: bool, at: Instant) {
        let st = self.channels.entry(channel).or_insert(ChannelState {
            stable: false,
            pending: None,
        });
        if level == st.stable {
            if st.pending.take().is_some() {
                tracing::trace!(channel, level, "bounce cancelled pending edge");
            }
            return;
        }
        match st.pending {
            // Repeated report of the level already pending: keep the original start.
            Some((p, _)) if p == level => {}
            _ => st.pending = Some((level, at)),
        }
    }

    /// Earliest instant at which a pending candidate could confirm.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.channels
            .values()
            .filter_map(|s| s.pending.map(|(_, since)| since + self.window))
            .min()
    }

    /// Confirm the earliest candidate whose window has elapsed by `now`.
    pub fn pop_confirmed(&mut self, now: Instant) -> Option<Confirmed> {
        let window = self.window;
        let (channel, level, at) = self
            .channels
            .iter()
            .filter_map(|(ch, s)| s.pending.map(|(level, since)| (*ch, level, since + window)))
            .filter(|(_, _, at)| *at <= now)
            .min_by_key(|(ch, _, at)| (*at, *ch))?;
        if let Some(st) = self.channels.get_mut(&channel) {
            st.stable = level;
            st.pending = None;
        }
        tracing::debug!(channel, level, "edge confirmed");
        Some(Confirmed { channel, level, at })
    }

    /// Confirm every candidate due by `now`, earliest first.
    pub fn poll(&mut self, now: Instant) -> Vec<Confirmed> {
        std::iter::from_fn(|| self.pop_confirmed(now)).collect()
    }
}
