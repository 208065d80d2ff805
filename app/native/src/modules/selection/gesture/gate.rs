//! Activation gate.
//!
//! Picking is only allowed once the user has held an open hand for the arm
//! duration. A short loss of the hand after arming is tolerated for the grace
//! period, which covers the gap between opening and closing the hand.

use std::time::Duration;

use tokio::time::Instant;

use super::types::GestureLabel;

/// Gate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unarmed,
    /// Open hand seen since `since`, waiting for the arm hold to elapse.
    Holding { since: Instant },
    /// Armed; `grace_since` is set while the hand is absent.
    Armed { grace_since: Option<Instant> },
}

/// Events emitted by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    Armed,
    Disarmed,
}

/// Debounces the arm precondition.
#[derive(Debug, Clone)]
pub struct ActivationGate {
    state: GateState,
    arm_hold: Duration,
    grace: Duration,
}

impl ActivationGate {
    #[must_use]
    pub const fn new(arm_hold: Duration, grace: Duration) -> Self {
        Self { state: GateState::Unarmed, arm_hold, grace }
    }

    #[must_use]
    pub const fn state(&self) -> GateState { self.state }

    #[must_use]
    pub const fn is_armed(&self) -> bool { matches!(self.state, GateState::Armed { .. }) }

    /// Feeds a classifier label observed at `at`.
    ///
    /// Timers that expired before `at` are settled first, so at most one
    /// event is returned per call.
    pub fn observe(&mut self, label: GestureLabel, at: Instant) -> Option<GateEvent> {
        let event = self.poll(at);

        self.state = match (self.state, label) {
            (GateState::Unarmed, GestureLabel::Open) => GateState::Holding { since: at },
            (GateState::Holding { .. }, GestureLabel::None | GestureLabel::Closed) => {
                GateState::Unarmed
            }
            (GateState::Armed { grace_since: None }, GestureLabel::None) => {
                GateState::Armed { grace_since: Some(at) }
            }
            (GateState::Armed { grace_since: Some(_) }, GestureLabel::Open | GestureLabel::Closed) => {
                GateState::Armed { grace_since: None }
            }
            (state, _) => state,
        };

        event
    }

    /// Settles the hold and grace timers at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<GateEvent> {
        match self.state {
            GateState::Holding { since } if now.saturating_duration_since(since) >= self.arm_hold => {
                self.state = GateState::Armed { grace_since: None };
                tracing::debug!("gesture gate armed");
                Some(GateEvent::Armed)
            }
            GateState::Armed { grace_since: Some(since) }
                if now.saturating_duration_since(since) >= self.grace =>
            {
                self.state = GateState::Unarmed;
                tracing::debug!("gesture gate disarmed after grace period");
                Some(GateEvent::Disarmed)
            }
            _ => None,
        }
    }

    /// Forces the gate back to unarmed, so the next pick needs a fresh arm.
    ///
    /// Returns `true` if the gate was armed.
    pub const fn disarm(&mut self) -> bool {
        let was_armed = self.is_armed();
        self.state = GateState::Unarmed;
        was_armed
    }
}
