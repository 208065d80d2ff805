//! Input adapters.
//!
//! Adapters turn raw gesture samples and pointer events into
//! [`SessionCommand`]s. They own the input-side timers and never touch the
//! pool or the pending slot; the session reports back through
//! [`InputAdapter::on_outcome`].

mod gesture;
mod pointer;

use std::fmt;

pub use gesture::GestureAdapter;
pub use pointer::PointerAdapter;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tokio::time::Instant;

use super::gesture::GestureSample;
use super::session::{Outcome, SessionCommand};
use super::state::ItemId;

/// Commands produced by a single input event.
pub type Commands = SmallVec<[SessionCommand; 2]>;

/// Where commands come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Hand gestures from an external classifier.
    Gesture,
    /// Mouse or touch.
    Pointer,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gesture => write!(f, "gesture"),
            Self::Pointer => write!(f, "pointer"),
        }
    }
}

/// Pointer events in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64, at: Instant },
    Move { x: f64, y: f64, at: Instant },
    /// Release. `target` is the pool item under the pointer, if any.
    Up { x: f64, y: f64, at: Instant, target: Option<ItemId> },
}

/// Raw input fed to the selection actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Gesture(GestureSample),
    Pointer(PointerEvent),
    /// Frame tick used to settle timers and apply inertia.
    Tick(Instant),
}

impl InputEvent {
    /// The input mode this event belongs to, or `None` for ticks.
    #[must_use]
    pub const fn mode(&self) -> Option<InputMode> {
        match self {
            Self::Gesture(_) => Some(InputMode::Gesture),
            Self::Pointer(_) => Some(InputMode::Pointer),
            Self::Tick(_) => None,
        }
    }
}

/// Translates raw input into session commands.
pub trait InputAdapter: Send {
    fn mode(&self) -> InputMode;

    /// Commands for one event, in the order they must be dispatched.
    fn translate(&mut self, event: &InputEvent) -> Commands;

    /// Lets the adapter follow the session's decisions.
    fn on_outcome(&mut self, outcome: &Outcome);

    /// Progress towards the next commit, in `[0, 1]`. Purely observational.
    fn progress(&self, now: Instant) -> f64;

    /// Whether the adapter currently allows a pick to begin.
    fn is_armed(&self) -> bool;
}
