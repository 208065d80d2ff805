//! Commands, phases and outcomes of a selection session.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::selection::effects::Generation;
use crate::modules::selection::input::InputMode;
use crate::modules::selection::pool::PoolError;
use crate::modules::selection::state::{ItemId, Pick};

/// Requests produced by input adapters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionCommand {
    /// The activation gate armed.
    Arm,
    /// The activation gate disarmed.
    Disarm,
    /// Take the item nearest to the reference point.
    BeginPick,
    /// Keep the pending item.
    Commit,
    /// Give the pending item back to the pool.
    Cancel,
    /// Begin and commit in one step. `None` picks the nearest item.
    DirectPick(Option<ItemId>),
    /// Turn the ring manually by the given angle in radians.
    RotateBy(f64),
    /// Suspend (`true`) or resume automatic rotation.
    HoldRotation(bool),
}

/// Which kind of session produced a draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Primary,
    Supplemental,
}

/// State of the session machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum SessionPhase {
    /// No session has been started.
    #[default]
    Idle,
    /// Waiting for the next pick.
    Ready,
    /// An item was taken from the pool and can still be cancelled.
    PickPending { item: ItemId, generation: Generation },
    /// The pick is revealing and docking into `slot`.
    Committing { item: ItemId, generation: Generation, slot: usize },
    /// Every pick of the session has been committed.
    Done,
}

impl SessionPhase {
    /// Whether a pick is between begin and dock.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::PickPending { .. } | Self::Committing { .. })
    }
}

/// The committed picks of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalDraw {
    /// Identifier of this draw, time ordered.
    pub reading: Uuid,
    pub kind: SessionKind,
    pub picks: Vec<Pick>,
}

impl FinalDraw {
    #[must_use]
    pub fn new(kind: SessionKind, picks: Vec<Pick>) -> Self {
        Self { reading: Uuid::now_v7(), kind, picks }
    }
}

/// Why a command was a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rejection {
    EmptyPool,
    NotStarted,
    NotArmed,
    PickInFlight,
    CommitInFlight,
    NothingPending,
    SessionDone,
    NotInPool(ItemId),
    StaleGeneration,
}

/// Observable result of a command or pipeline event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Armed,
    Disarmed,
    PickStarted { item: ItemId, generation: Generation },
    CommitStarted { item: ItemId, generation: Generation, slot: usize },
    Committed(Pick),
    Completed(FinalDraw),
    Cancelled { item: ItemId, generation: Generation },
    Rejected(Rejection),
}

/// Errors that abort a session command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The pool reported an ownership violation.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// The command came from an input the session does not accept.
    #[error("Session expects {expected} input, got {got}")]
    InputModeMismatch { expected: InputMode, got: InputMode },

    /// The session cannot restart while a pick is in flight.
    #[error("A pick is still in flight")]
    PickInFlight,

    /// Not enough candidates remain for the requested number of picks.
    #[error("Session needs {needed} items but only {available} are available")]
    InsufficientItems { needed: usize, available: usize },

    /// A session must pick at least one item.
    #[error("Session target must be at least one pick")]
    InvalidTarget,
}
