//! Card artwork loading.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

/// Loaded card artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub uri: String,
    pub data: Arc<[u8]>,
}

impl Resource {
    /// Wraps loaded bytes.
    #[must_use]
    pub fn new(uri: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self { uri: uri.into(), data: data.into() }
    }
}

/// Errors that can occur while loading artwork.
///
/// None of these are fatal: the pick continues with the fallback artwork.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The resource does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The loader failed for another reason.
    #[error("Failed to load {uri}: {reason}")]
    Failed { uri: String, reason: String },

    /// The load did not finish in time.
    #[error("Loading timed out after {0:?}")]
    Timeout(Duration),

    /// The load task was cancelled or panicked.
    #[error("Loading was aborted")]
    Aborted,
}

/// Asynchronous artwork loader with arbitrary latency.
///
/// The returned future must not borrow the loader so it can run on its own task.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, uri: &str) -> BoxFuture<'static, Result<Resource, LoadError>>;
}
