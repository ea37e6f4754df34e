//! Animation scheduling without blocking.
//!
//! The render loop calls into the effects once per tick with the current
//! time. These two helpers decide what that tick should do: a
//! `TimedAnimation` turns elapsed time into a 0..1 progress value, an
//! `IntervalTimer` lets a fixed-rate effect step only when its interval has
//! passed. Both can be cancelled at any time by the caller.

use std::time::{Duration, Instant};

// ── TimedAnimation ───────────────────────────────────────────────────

/// One animation run of a fixed duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedAnimation {
    started: Instant,
    duration: Duration,
}

impl TimedAnimation {
    pub fn start(now: Instant, duration: Duration) -> Self {
        Self {
            started: now,
            duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Fraction of the duration elapsed at `now`, in `0.0..=1.0`.
    ///
    /// Never decreases for increasing `now`. A zero-length animation is
    /// complete immediately.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}

// ── IntervalTimer ────────────────────────────────────────────────────

/// Fixed-step rate limiter.
///
/// The first poll after construction or `reset` fires immediately; later
/// polls fire once `interval` has passed since the previous firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalTimer {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    /// Returns true (and records `now`) if a step is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_fired {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last_fired = Some(now);
        true
    }

    /// Forget the last firing so the next poll fires at once.
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(500, 0.25)]
    #[case(1000, 0.5)]
    #[case(2000, 1.0)]
    #[case(9000, 1.0)]
    fn test_progress(#[case] elapsed: u64, #[case] expected: f32) {
        let t0 = Instant::now();
        let animation = TimedAnimation::start(t0, ms(2000));
        assert!((animation.progress(t0 + ms(elapsed)) - expected).abs() < 1e-6);
    }

    #[test]
    fn progress_is_monotonic() {
        let t0 = Instant::now();
        let animation = TimedAnimation::start(t0, ms(3000));
        let mut previous = 0.0;
        for step in 0..=400 {
            let p = animation.progress(t0 + ms(step * 10));
            assert!(p >= previous);
            previous = p;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn progress_before_start_is_zero() {
        let t0 = Instant::now();
        let animation = TimedAnimation::start(t0 + ms(100), ms(1000));
        assert_eq!(animation.progress(t0), 0.0);
    }

    #[test]
    fn zero_duration_is_complete_at_once() {
        let t0 = Instant::now();
        let animation = TimedAnimation::start(t0, Duration::ZERO);
        assert!(animation.is_complete(t0));
        assert_eq!(animation.progress(t0), 1.0);
    }

    #[test]
    fn completes_exactly_at_duration() {
        let t0 = Instant::now();
        let animation = TimedAnimation::start(t0, ms(2500));
        assert!(!animation.is_complete(t0 + ms(2499)));
        assert!(animation.is_complete(t0 + ms(2500)));
    }

    #[test]
    fn interval_fires_first_poll_then_rate_limits() {
        let t0 = Instant::now();
        let mut timer = IntervalTimer::new(ms(80));

        assert!(timer.poll(t0));
        assert!(!timer.poll(t0 + ms(1)));
        assert!(!timer.poll(t0 + ms(79)));
        assert!(timer.poll(t0 + ms(80)));
        assert!(!timer.poll(t0 + ms(159)));
        assert!(timer.poll(t0 + ms(160)));
    }

    #[test]
    fn reset_makes_next_poll_fire() {
        let t0 = Instant::now();
        let mut timer = IntervalTimer::new(ms(80));
        assert!(timer.poll(t0));
        timer.reset();
        assert!(timer.poll(t0 + ms(1)));
    }
}
