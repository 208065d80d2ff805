//! Gesture adapter.

use std::time::Duration;

use smallvec::SmallVec;
use tokio::time::Instant;

use super::{Commands, InputAdapter, InputEvent, InputMode};
use crate::config::GestureConfig;
use crate::modules::selection::gesture::{
    ActivationGate, GateEvent, GestureLabel, GestureSample, GrabTimer,
};
use crate::modules::selection::session::{Outcome, SessionCommand};

/// Drives picks from open-hand and fist gestures.
///
/// Holding an open hand arms the gate. Closing the fist while armed begins a
/// pick, keeping it closed for the commit threshold commits it, and opening
/// or losing the hand before that cancels it.
#[derive(Debug, Clone)]
pub struct GestureAdapter {
    gate: ActivationGate,
    grab: GrabTimer,
    absence_timeout: Duration,
    last_label: GestureLabel,
    last_seen: Option<Instant>,
    /// The session holds a pick that can still be committed or cancelled.
    pending: bool,
}

impl GestureAdapter {
    #[must_use]
    pub const fn new(config: &GestureConfig) -> Self {
        Self {
            gate: ActivationGate::new(config.arm_hold(), config.grace()),
            grab: GrabTimer::new(config.commit_threshold()),
            absence_timeout: config.absence_timeout(),
            last_label: GestureLabel::None,
            last_seen: None,
            pending: false,
        }
    }

    fn observe(&mut self, sample: GestureSample, commands: &mut Commands) {
        push_gate_event(self.gate.observe(sample.label, sample.at), commands);

        let was_closed = self.last_label == GestureLabel::Closed;
        let is_closed = sample.label == GestureLabel::Closed;

        if is_closed && !was_closed && self.gate.is_armed() {
            commands.push(SessionCommand::BeginPick);
            self.grab.start(sample.at);
        } else if was_closed && !is_closed && self.grab.is_running() {
            self.grab.cancel();
            if self.pending {
                commands.push(SessionCommand::Cancel);
            }
        }

        self.last_label = sample.label;
        self.last_seen = Some(sample.at);
    }

    /// Treats a sample gap longer than the absence timeout as the hand being
    /// lost at the last sample.
    fn settle_absence(&mut self, now: Instant, commands: &mut Commands) {
        let Some(seen) = self.last_seen else {
            return;
        };
        if self.last_label != GestureLabel::None
            && now.saturating_duration_since(seen) >= self.absence_timeout
        {
            tracing::trace!("gesture absent, treating as none");
            self.observe(GestureSample::new(GestureLabel::None, seen), commands);
        }
    }

    fn settle(&mut self, now: Instant, commands: &mut Commands) {
        self.settle_absence(now, commands);
        push_gate_event(self.gate.poll(now), commands);

        if self.grab.poll(now).is_some() && self.pending {
            commands.push(SessionCommand::Commit);
        }
    }
}

fn push_gate_event(event: Option<GateEvent>, commands: &mut Commands) {
    match event {
        Some(GateEvent::Armed) => commands.push(SessionCommand::Arm),
        Some(GateEvent::Disarmed) => commands.push(SessionCommand::Disarm),
        None => {}
    }
}

impl InputAdapter for GestureAdapter {
    fn mode(&self) -> InputMode { InputMode::Gesture }

    fn translate(&mut self, event: &InputEvent) -> Commands {
        let mut commands = SmallVec::new();
        match *event {
            InputEvent::Gesture(sample) => {
                self.settle_absence(sample.at, &mut commands);
                self.observe(sample, &mut commands);
                if self.grab.poll(sample.at).is_some() && self.pending {
                    commands.push(SessionCommand::Commit);
                }
            }
            InputEvent::Tick(now) => self.settle(now, &mut commands),
            InputEvent::Pointer(_) => {}
        }
        commands
    }

    fn on_outcome(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::PickStarted { .. } => self.pending = true,
            Outcome::CommitStarted { .. } => {
                self.pending = false;
                self.grab.cancel();
            }
            Outcome::Cancelled { .. } | Outcome::Committed(_) | Outcome::Completed(_) => {
                // Every new pick starts from a fresh open hand.
                self.pending = false;
                self.grab.cancel();
                self.gate.disarm();
            }
            Outcome::Armed | Outcome::Disarmed | Outcome::Rejected(_) => {}
        }
    }

    fn progress(&self, now: Instant) -> f64 {
        if self.pending { self.grab.progress(now) } else { 0.0 }
    }

    fn is_armed(&self) -> bool { self.gate.is_armed() }
}
