//! Handle for communicating with the selection actor.
//!
//! The `SelectionActorHandle` provides a cloneable interface for sending
//! input, starting sessions and subscribing to state changes.

use std::time::Duration;

use eyeball::{SharedObservable, Subscriber};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::messages::{QueryResult, SelectionMessage, SelectionQuery, SelectionSnapshot};
use crate::modules::selection::input::{InputEvent, InputMode};
use crate::modules::selection::session::{FinalDraw, SessionError};
use crate::modules::selection::state::{Item, ItemId, Pick};

/// Error types for actor communication.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// Failed to send message to actor.
    #[error("Failed to send message to actor: channel closed")]
    SendFailed,

    /// Failed to receive response from actor.
    #[error("Failed to receive response from actor: channel closed")]
    ReceiveFailed,

    /// Query timed out.
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// The actor refused to start a session.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The actor answered with a result of the wrong kind.
    #[error("Unexpected query result")]
    UnexpectedResult,
}

/// Handle for communicating with the selection actor.
///
/// This handle is cheap to clone and can be shared across threads.
#[derive(Clone)]
pub struct SelectionActorHandle {
    sender: mpsc::Sender<SelectionMessage>,
    snapshot: SharedObservable<SelectionSnapshot>,
    completed: broadcast::Sender<FinalDraw>,
}

impl SelectionActorHandle {
    pub(crate) const fn new(
        sender: mpsc::Sender<SelectionMessage>,
        snapshot: SharedObservable<SelectionSnapshot>,
        completed: broadcast::Sender<FinalDraw>,
    ) -> Self {
        Self { sender, snapshot, completed }
    }

    // ========================================================================
    // Fire-and-forget sending
    // ========================================================================

    /// Send a message to the actor without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn send(&self, msg: SelectionMessage) -> Result<(), ActorError> {
        self.sender.try_send(msg).map_err(|_| ActorError::SendFailed)
    }

    /// Send a message to the actor and wait for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn send_async(&self, msg: SelectionMessage) -> Result<(), ActorError> {
        self.sender.send(msg).await.map_err(|_| ActorError::SendFailed)
    }

    /// Whether the actor is still running.
    #[must_use]
    pub fn is_alive(&self) -> bool { !self.sender.is_closed() }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Execute a query and wait for the result.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed, or
    /// [`ActorError::ReceiveFailed`] if the response channel is closed.
    pub async fn query(&self, query: SelectionQuery) -> Result<QueryResult, ActorError> {
        let (tx, rx) = oneshot::channel();

        self.send_async(SelectionMessage::Query { query, respond_to: tx }).await?;

        rx.await.map_err(|_| ActorError::ReceiveFailed)
    }

    /// Execute a query with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Timeout`] if the query doesn't complete in time,
    /// or any error from [`Self::query`].
    pub async fn query_timeout(
        &self,
        query: SelectionQuery,
        timeout: Duration,
    ) -> Result<QueryResult, ActorError> {
        tokio::time::timeout(timeout, self.query(query))
            .await
            .map_err(|_| ActorError::Timeout(timeout))?
    }

    /// Committed picks of the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn committed(&self) -> Result<Vec<Pick>, ActorError> {
        match self.query(SelectionQuery::Committed).await? {
            QueryResult::Picks(picks) => Ok(picks),
            _ => Err(ActorError::UnexpectedResult),
        }
    }

    /// Items currently in the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn pool_items(&self) -> Result<Vec<Item>, ActorError> {
        match self.query(SelectionQuery::PoolItems).await? {
            QueryResult::Items(items) => Ok(items),
            _ => Err(ActorError::UnexpectedResult),
        }
    }

    /// Every item drawn in the current reading.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn drawn_history(&self) -> Result<Vec<ItemId>, ActorError> {
        match self.query(SelectionQuery::DrawnHistory).await? {
            QueryResult::Drawn(drawn) => Ok(drawn),
            _ => Err(ActorError::UnexpectedResult),
        }
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Start a new reading driven by `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Session`] if the session cannot start, or a
    /// channel error if the actor has stopped.
    pub async fn start_reading(&self, mode: InputMode) -> Result<(), ActorError> {
        let (tx, rx) = oneshot::channel();
        self.send_async(SelectionMessage::StartReading { mode, respond_to: tx }).await?;
        rx.await.map_err(|_| ActorError::ReceiveFailed)?.map_err(ActorError::from)
    }

    /// Start a supplemental pointer session of `count` extra picks.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Session`] if the session cannot start, or a
    /// channel error if the actor has stopped.
    pub async fn start_supplement(&self, count: Option<usize>) -> Result<(), ActorError> {
        let (tx, rx) = oneshot::channel();
        self.send_async(SelectionMessage::StartSupplement { count, respond_to: tx }).await?;
        rx.await.map_err(|_| ActorError::ReceiveFailed)?.map_err(ActorError::from)
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Feed one input event without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn input(&self, event: InputEvent) -> Result<(), ActorError> {
        self.send(SelectionMessage::Input(event))
    }

    /// Feed one input event, waiting for channel capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn input_async(&self, event: InputEvent) -> Result<(), ActorError> {
        self.send_async(SelectionMessage::Input(event)).await
    }

    /// Stop the actor.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor already stopped.
    pub fn shutdown(&self) -> Result<(), ActorError> { self.send(SelectionMessage::Shutdown) }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SelectionSnapshot { self.snapshot.get() }

    /// Subscribe to snapshot changes.
    #[must_use]
    pub fn subscribe_snapshot(&self) -> Subscriber<SelectionSnapshot> { self.snapshot.subscribe() }

    /// Subscribe to finished draws.
    #[must_use]
    pub fn subscribe_completed(&self) -> broadcast::Receiver<FinalDraw> {
        self.completed.subscribe()
    }
}

impl std::fmt::Debug for SelectionActorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionActorHandle").field("alive", &self.is_alive()).finish_non_exhaustive()
    }
}
