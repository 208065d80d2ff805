//! Error types for Arcana.
//!
//! Each module has its own `thiserror` enum. `ArcanaError` flattens them into
//! a serializable shape for hosts that forward errors across a process or
//! language boundary.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::modules::deck::DeckError;
use crate::modules::selection::{ActorError, LoadError, PoolError, SessionError};

/// Errors that can occur while running a reading.
///
/// Serializes as `{ "kind": "...", "message": "..." }`.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum ArcanaError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// The deck could not be loaded.
    #[error("Deck error: {0}")]
    DeckError(String),
    /// Pool membership was violated.
    #[error("Pool error: {0}")]
    PoolError(String),
    /// A session command or start failed.
    #[error("Session error: {0}")]
    SessionError(String),
    /// Card artwork could not be loaded.
    #[error("Load error: {0}")]
    LoadError(String),
    /// Communication with the selection actor failed.
    #[error("Actor error: {0}")]
    ActorError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<ConfigError> for ArcanaError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<DeckError> for ArcanaError {
    fn from(err: DeckError) -> Self { Self::DeckError(err.to_string()) }
}

impl From<PoolError> for ArcanaError {
    fn from(err: PoolError) -> Self { Self::PoolError(err.to_string()) }
}

impl From<SessionError> for ArcanaError {
    fn from(err: SessionError) -> Self { Self::SessionError(err.to_string()) }
}

impl From<LoadError> for ArcanaError {
    fn from(err: LoadError) -> Self { Self::LoadError(err.to_string()) }
}

impl From<ActorError> for ArcanaError {
    fn from(err: ActorError) -> Self {
        match err {
            ActorError::Session(err) => err.into(),
            other => Self::ActorError(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ArcanaError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}
