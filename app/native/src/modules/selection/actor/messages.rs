//! Message types for the selection actor.
//!
//! - `SelectionMessage` - inputs and commands sent to the actor
//! - `SelectionQuery` - requests for state data (with response channel)
//! - `QueryResult` - responses from queries

use serde::Serialize;
use tokio::sync::oneshot;

use crate::modules::selection::input::{InputEvent, InputMode};
use crate::modules::selection::session::{SessionError, SessionKind, SessionPhase};
use crate::modules::selection::state::{Item, ItemId, Pick};

// ============================================================================
// Selection Messages
// ============================================================================

/// Messages sent to the selection actor.
#[derive(Debug)]
pub enum SelectionMessage {
    /// Start a new reading driven by `mode`, forgetting earlier draws.
    StartReading {
        mode: InputMode,
        respond_to: oneshot::Sender<Result<(), SessionError>>,
    },

    /// Start a pointer session for extra cards on top of the current reading.
    ///
    /// `count` defaults to the configured supplement size.
    StartSupplement {
        count: Option<usize>,
        respond_to: oneshot::Sender<Result<(), SessionError>>,
    },

    /// Raw gesture, pointer or tick input.
    Input(InputEvent),

    /// Query state with a response channel.
    Query {
        query: SelectionQuery,
        respond_to: oneshot::Sender<QueryResult>,
    },

    /// Stop the actor and dispose every visual it created.
    Shutdown,
}

impl SelectionMessage {
    /// Message name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StartReading { .. } => "StartReading",
            Self::StartSupplement { .. } => "StartSupplement",
            Self::Input(_) => "Input",
            Self::Query { .. } => "Query",
            Self::Shutdown => "Shutdown",
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Queries for reading state from the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionQuery {
    Snapshot,
    /// Committed picks of the current session.
    Committed,
    /// Items currently in the pool, in ring order.
    PoolItems,
    /// Every item drawn in the current reading, across sessions.
    DrawnHistory,
}

/// Results from queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Snapshot(SelectionSnapshot),
    Picks(Vec<Pick>),
    Items(Vec<Item>),
    Drawn(Vec<ItemId>),
}

// ============================================================================
// Snapshot
// ============================================================================

/// Observable summary of the selection state, published after every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    pub phase: SessionPhase,
    pub kind: SessionKind,
    /// Input mode of the running session, `None` before the first start.
    pub mode: Option<InputMode>,
    pub pool_size: usize,
    pub pending: Option<ItemId>,
    pub committed: Vec<Pick>,
    pub armed: bool,
    /// Progress of the fist hold towards a commit, in `[0, 1]`.
    pub grab_progress: f64,
    /// Last pool contract violation since the session started.
    pub fault: Option<String>,
}
