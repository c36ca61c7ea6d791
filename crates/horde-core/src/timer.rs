//! Countdown timers shared by the pool and the timed systems.
//!
//! Steps arrive as `f32` seconds. Subtracting them from an `f32` countdown
//! loses a little precision each tick, and at 60 Hz a 2 s countdown ends up
//! firing one tick after the steps already add up to 2 s. [`Countdown`]
//! keeps the remaining time in `f64`, where the sum of `f32` steps is exact
//! for any practical session length, so it expires on the first tick whose
//! steps sum to at least its duration.

use serde::{Deserialize, Serialize};

/// Time left until something happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: f64,
}

impl Countdown {
    /// A countdown of `seconds`.
    #[must_use]
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: f64::from(seconds),
        }
    }

    /// A countdown that has already run out.
    #[must_use]
    pub const fn elapsed() -> Self {
        Self { remaining: 0.0 }
    }

    /// Seconds left, never negative.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0) as f32
    }

    /// True once the countdown reached zero.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Count down by `dt`. Returns [`Countdown::is_done`].
    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining -= f64::from(dt);
        self.is_done()
    }

    /// Start over with `seconds` left.
    pub fn restart(&mut self, seconds: f32) {
        self.remaining = f64::from(seconds);
    }

    /// Run out immediately.
    pub fn finish(&mut self) {
        self.remaining = 0.0;
    }

    /// Never leave more than `seconds` on the clock.
    pub fn cap(&mut self, seconds: f32) {
        self.remaining = self.remaining.min(f64::from(seconds));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn expires_on_the_tick_steps_reach_duration() {
        let mut countdown = Countdown::new(2.0);
        let mut sum = 0.0f64;
        let mut fired_at = None;
        for tick in 1..=200 {
            sum += f64::from(DT);
            if countdown.advance(DT) {
                fired_at = Some(tick);
                break;
            }
        }
        assert_eq!(fired_at, Some(120));
        assert!(sum >= 2.0);
    }

    #[test]
    fn exact_steps_expire_exactly() {
        let mut countdown = Countdown::new(1.0);
        assert!(!countdown.advance(0.5));
        assert!(countdown.advance(0.5));
        assert_eq!(countdown.remaining(), 0.0);
    }

    #[test]
    fn cap_only_shortens() {
        let mut countdown = Countdown::new(1.0);
        countdown.cap(2.0);
        assert_eq!(countdown.remaining(), 1.0);
        countdown.cap(0.25);
        assert_eq!(countdown.remaining(), 0.25);
    }

    #[test]
    fn finish_and_restart() {
        let mut countdown = Countdown::new(3.0);
        countdown.finish();
        assert!(countdown.is_done());
        countdown.restart(0.5);
        assert!(!countdown.is_done());
        assert!(Countdown::elapsed().is_done());
    }
}
