//! Generation tokens.
//!
//! Every pick animation captures the generation that was current when it
//! started. Cancelling or starting a new pick advances the counter, and a
//! phase resuming after a suspension point compares its captured value with
//! the current one before touching the scene.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Identifier of one animation run. Later runs have larger values.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "g{}", self.0) }
}

/// Shared, monotonically increasing generation counter.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: Arc<AtomicU64>,
}

impl GenerationCounter {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// The generation currently allowed to mutate the scene.
    #[must_use]
    pub fn current(&self) -> Generation { Generation(self.current.load(Ordering::Acquire)) }

    /// Invalidates every earlier generation and returns the new one.
    pub fn advance(&self) -> Generation {
        Generation(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `generation` is still current.
    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool { self.current() == generation }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let counter = GenerationCounter::new();
        let first = counter.advance();
        let second = counter.advance();

        assert!(second > first);
        assert_eq!(counter.current(), second);
    }

    #[test]
    fn test_advance_invalidates_previous() {
        let counter = GenerationCounter::new();
        let first = counter.advance();
        assert!(counter.is_current(first));

        counter.advance();
        assert!(!counter.is_current(first));
    }

    #[test]
    fn test_clones_share_the_counter() {
        let counter = GenerationCounter::new();
        let view = counter.clone();
        let generation = counter.advance();
        assert!(view.is_current(generation));
    }
}
