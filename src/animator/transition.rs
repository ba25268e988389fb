//! One timed, linearly eased transition between two animation steps.

use chrono::NaiveDateTime;
use std::time::Duration;
use tokio::time::Instant;

/// Handle passed to every sink update of a step.
///
/// All four updates of a step share one transition, so they share its
/// start instant and deadline.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Index of the frame this transition moves to.
    pub step: usize,
    /// Label of the frame (its interval's start date).
    pub date: NaiveDateTime,
    pub duration: Duration,
    /// Value axis domain, `(0, max visible value)`.
    pub domain: (f64, f64),
    started: Instant,
}

impl Transition {
    /// Start a transition now.
    pub fn new(step: usize, date: NaiveDateTime, duration: Duration, domain_max: f64) -> Self {
        Self {
            step,
            date,
            duration,
            domain: (0.0, domain_max),
            started: Instant::now(),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.started + self.duration
    }

    /// Resolves once the transition's duration has elapsed.
    pub async fn end(&self) {
        tokio::time::sleep_until(self.deadline()).await;
    }

    /// Linear progress in `[0, 1]` at `now`.
    pub fn progress_at(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    #[cfg(test)]
    pub fn progress(&self) -> f64 {
        self.progress_at(Instant::now())
    }

    /// Value of a number tweened from `from` to `to` at `now`.
    pub fn tween_at(&self, from: f64, to: f64, now: Instant) -> f64 {
        let t = self.progress_at(now);
        from + (to - from) * t
    }
}
