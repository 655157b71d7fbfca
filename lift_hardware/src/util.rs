use std::time::{Duration, Instant};

use std::sync::atomic::{AtomicBool, Ordering};

/// Logical (active) level of a sensor line given its electrical level.
///
/// Proximity switches on pull-up inputs pull the line low when they trip.
#[inline]
pub fn logical_level(is_high: bool, active_low: bool) -> bool {
    is_high != active_low
}

/// Sleep for `total`, waking every `slice` to check `stop`.
///
/// Returns `false` if `stop` was raised before the time ran out.
pub fn sleep_unless_stopped(stop: &AtomicBool, total: Duration, slice: Duration) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(slice.min(deadline - now));
    }
}
