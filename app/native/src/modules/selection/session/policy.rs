//! Session policies.

use std::collections::HashSet;

use super::types::{SessionError, SessionKind};
use crate::modules::selection::input::InputMode;
use crate::modules::selection::state::ItemId;

/// What a session accepts and how many picks it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    pub kind: SessionKind,
    /// The only input mode whose commands are accepted.
    pub trigger: InputMode,
    /// Number of picks that completes the session.
    pub target: usize,
    /// Items that must not be dealt into the pool.
    pub exclude: HashSet<ItemId>,
    /// Slot index of the first pick, so later sessions dock after earlier cards.
    pub slot_offset: usize,
}

impl SessionPolicy {
    /// A fresh reading driven by `trigger`.
    #[must_use]
    pub fn primary(target: usize, trigger: InputMode) -> Self {
        Self {
            kind: SessionKind::Primary,
            trigger,
            target,
            exclude: HashSet::new(),
            slot_offset: 0,
        }
    }

    /// Extra pointer picks on top of the cards already drawn in `exclude`.
    #[must_use]
    pub fn supplemental(target: usize, exclude: HashSet<ItemId>) -> Self {
        Self {
            kind: SessionKind::Supplemental,
            trigger: InputMode::Pointer,
            target,
            slot_offset: exclude.len(),
            exclude,
        }
    }

    /// Checks that the policy can be satisfied at all.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTarget`] for a zero target.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.target == 0 {
            return Err(SessionError::InvalidTarget);
        }
        Ok(())
    }
}
