//! One-shot timer bookkeeping.
//!
//! This reproduces the Contiki `ctimer` contract the original protocol is
//! built on (`set`, `stop`, `expired`, `reset`, `remaining`) without owning
//! an event loop: a [`OneshotTimer`] just tracks a deadline. The embedding
//! host runtime is responsible for noticing `expired(now)` flip to `true`
//! and invoking the matching `Connection::on_*_timer` handler (spec §4.5,
//! §5 — "waiting is expressed by arming a timer and returning").

use embassy_time::{Duration, Instant};

/// A single one-shot deadline.
///
/// A timer that has never been `set` (or has been `stop`ped) reports
/// `expired() == true`, matching `ctimer_expired` on a zeroed `ctimer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneshotTimer {
    deadline: Option<Instant>,
    last_delay: Option<Duration>,
}

impl OneshotTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer to fire `delay` after `now`.
    pub fn set(&mut self, delay: Duration, now: Instant) {
        self.deadline = Some(now + delay);
        self.last_delay = Some(delay);
    }

    /// Disarms the timer. `expired` reports `true` from this point on.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// `true` if the timer was never armed, has been stopped, or its
    /// deadline has passed.
    pub fn expired(&self, now: Instant) -> bool {
        match self.deadline {
            Some(d) => now >= d,
            None => true,
        }
    }

    /// Re-arms for the same delay as the last `set`, counted from `now`.
    /// A no-op if the timer has never been set.
    pub fn reset(&mut self, now: Instant) {
        if let Some(delay) = self.last_delay {
            self.set(delay, now);
        }
    }

    /// Time remaining until the deadline, zero if already expired or unset.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.deadline {
            Some(d) if d > now => d - now,
            _ => Duration::from_ticks(0),
        }
    }

    /// The absolute deadline, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// A free-running reference timer (spec's `delay_timer`, 120 s default).
/// Never carries a callback; only ever queried via `remaining`.
#[derive(Debug, Clone, Copy)]
pub struct DelayTimer {
    inner: OneshotTimer,
}

impl DelayTimer {
    pub fn new(window: Duration, now: Instant) -> Self {
        let mut inner = OneshotTimer::new();
        inner.set(window, now);
        DelayTimer { inner }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.inner.remaining(now)
    }

    pub fn restart(&mut self, window: Duration, now: Instant) {
        self.inner.set(window, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn unset_timer_is_expired() {
        let timer = OneshotTimer::new();
        assert!(timer.expired(t(0)));
    }

    #[test]
    fn set_timer_expires_after_delay() {
        let mut timer = OneshotTimer::new();
        timer.set(Duration::from_millis(100), t(0));
        assert!(!timer.expired(t(50)));
        assert!(timer.expired(t(100)));
        assert!(timer.expired(t(150)));
    }

    #[test]
    fn stop_makes_timer_expired_again() {
        let mut timer = OneshotTimer::new();
        timer.set(Duration::from_millis(100), t(0));
        timer.stop();
        assert!(timer.expired(t(0)));
    }

    #[test]
    fn reset_rearms_for_the_same_delay() {
        let mut timer = OneshotTimer::new();
        timer.set(Duration::from_millis(100), t(0));
        timer.reset(t(50));
        assert!(!timer.expired(t(100)));
        assert!(timer.expired(t(150)));
    }

    #[test]
    fn remaining_is_zero_once_expired() {
        let mut timer = OneshotTimer::new();
        timer.set(Duration::from_millis(100), t(0));
        assert_eq!(timer.remaining(t(200)), Duration::from_ticks(0));
    }

    #[test]
    fn delay_timer_reports_decreasing_remainder() {
        let timer = DelayTimer::new(Duration::from_secs(120), t(0));
        assert!(timer.remaining(t(1000)) < Duration::from_secs(120));
    }
}
