//! Grab timer.
//!
//! Measures how long a fist has been held. When the commit threshold is
//! reached it fires once and restarts its own clock, so holding the fist keeps
//! producing thresholds without outside help.

use std::time::Duration;

use tokio::time::Instant;

/// The fist was held for the full commit threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdReached {
    pub at: Instant,
}

#[derive(Debug, Clone)]
pub struct GrabTimer {
    threshold: Duration,
    started: Option<Instant>,
}

impl GrabTimer {
    #[must_use]
    pub const fn new(threshold: Duration) -> Self { Self { threshold, started: None } }

    /// Starts (or restarts) measuring from `at`.
    pub const fn start(&mut self, at: Instant) { self.started = Some(at); }

    /// Stops measuring without firing.
    pub const fn cancel(&mut self) { self.started = None; }

    #[must_use]
    pub const fn is_running(&self) -> bool { self.started.is_some() }

    /// Fires once the threshold has elapsed, then re-arms from `now`.
    pub fn poll(&mut self, now: Instant) -> Option<ThresholdReached> {
        let started = self.started?;
        if now.saturating_duration_since(started) < self.threshold {
            return None;
        }

        self.started = Some(now);
        Some(ThresholdReached { at: now })
    }

    /// Fraction of the threshold elapsed at `now`, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, now: Instant) -> f64 {
        let Some(started) = self.started else {
            return 0.0;
        };

        if self.threshold.is_zero() {
            return 1.0;
        }

        let elapsed = now.saturating_duration_since(started).as_secs_f64();
        (elapsed / self.threshold.as_secs_f64()).clamp(0.0, 1.0)
    }
}
