//! Microsecond time base.
//!
//! All scheduling math runs on a free-running 32-bit microsecond counter that
//! wraps roughly every 71 minutes. Timestamps are never compared directly;
//! [`cmp_time_us`] turns two timestamps into a signed delta, which stays
//! correct across a wrap as long as the two points are less than ~35 minutes
//! apart.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU32, Ordering};

/// Free-running microsecond timestamp.
pub type TimeUs = u32;

/// Signed difference between two [`TimeUs`] values.
pub type TimeDelta = i32;

/// Shortest period the scheduler accepts for any task.
pub const MIN_PERIOD_US: u32 = 10;

/// Longest period that still compares correctly through [`cmp_time_us`].
pub const MAX_PERIOD_US: u32 = TimeDelta::MAX as u32;

/// Returns `None` for periods in `MIN_PERIOD_US..=MAX_PERIOD_US`, otherwise
/// the period to use instead.
///
/// Values above [`MAX_PERIOD_US`] are negative deltas that went through a
/// `u32` (e.g. `deadline.wrapping_sub(now)` after the deadline passed) and
/// get the same treatment as any other too-short request.
#[inline]
pub const fn clamped_period(period_us: u32) -> Option<u32> {
    if period_us >= MIN_PERIOD_US && period_us <= MAX_PERIOD_US {
        None
    } else {
        Some(MIN_PERIOD_US)
    }
}

/// Returns `a - b` as a signed delta, tolerating counter wrap-around.
#[inline]
pub const fn cmp_time_us(a: TimeUs, b: TimeUs) -> TimeDelta {
    a.wrapping_sub(b) as TimeDelta
}

/// Converts a rate in Hz into a period in microseconds.
#[inline]
pub const fn task_period_hz(hz: u32) -> u32 {
    1_000_000 / hz
}

#[inline]
pub const fn task_period_ms(ms: u32) -> u32 {
    ms * 1_000
}

#[inline]
pub const fn task_period_us(us: u32) -> u32 {
    us
}

/// Monotonic microsecond time source.
pub trait Clock {
    fn micros(&self) -> TimeUs;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn micros(&self) -> TimeUs {
        (**self).micros()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn micros(&self) -> TimeUs {
        (**self).micros()
    }
}

/// Clock whose value only moves when told to.
///
/// Clones share the same counter, so a task body holding a clone can
/// simulate its own execution time by calling [`ManualClock::advance`].
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU32>,
}

impl ManualClock {
    pub fn new(start: TimeUs) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(start)),
        }
    }

    pub fn set(&self, now: TimeUs) {
        self.now.store(now, Ordering::Relaxed);
    }

    /// Moves the clock forward, wrapping like the hardware counter does.
    pub fn advance(&self, delta_us: u32) {
        let now = self.now.load(Ordering::Relaxed);
        self.now.store(now.wrapping_add(delta_us), Ordering::Relaxed);
    }

    pub fn now(&self) -> TimeUs {
        self.now.load(Ordering::Relaxed)
    }
}

impl Clock for ManualClock {
    fn micros(&self) -> TimeUs {
        self.now()
    }
}

#[cfg(feature = "std")]
pub use host::HostClock;

#[cfg(feature = "std")]
mod host {
    use super::{Clock, TimeUs};
    use std::time::Instant;

    /// Wall-clock source for host builds, counting from construction.
    #[derive(Debug, Clone, Copy)]
    pub struct HostClock {
        epoch: Instant,
    }

    impl HostClock {
        pub fn new() -> Self {
            Self {
                epoch: Instant::now(),
            }
        }
    }

    impl Default for HostClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for HostClock {
        fn micros(&self) -> TimeUs {
            // Truncation reproduces the wrap of a 32-bit hardware timer.
            self.epoch.elapsed().as_micros() as TimeUs
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmp_handles_wrap() {
        let before = u32::MAX - 99;
        let after = before.wrapping_add(200);
        assert_eq!(cmp_time_us(after, before), 200);
        assert_eq!(cmp_time_us(before, after), -200);
    }

    #[test]
    fn period_helpers() {
        assert_eq!(task_period_hz(500), 2_000);
        assert_eq!(task_period_hz(1), 1_000_000);
        assert_eq!(task_period_ms(5), 5_000);
        assert_eq!(task_period_us(125), 125);
    }

    #[test]
    fn manual_clock_clones_share_counter() {
        let clock = ManualClock::new(u32::MAX);
        let probe = clock.clone();
        clock.advance(2);
        assert_eq!(probe.micros(), 1);
    }
}
