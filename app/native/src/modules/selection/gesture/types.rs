//! Gesture classifier events.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Discrete hand pose reported by the external classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GestureLabel {
    /// No hand, or a pose that is neither open nor closed.
    #[default]
    None,
    /// Open palm.
    Open,
    /// Closed fist.
    Closed,
}

/// One labeled classifier sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureSample {
    pub label: GestureLabel,
    pub at: Instant,
}

impl GestureSample {
    #[must_use]
    pub const fn new(label: GestureLabel, at: Instant) -> Self { Self { label, at } }
}
