//! Feature modules for Arcana.
//!
//! - [`deck`] - The card catalogue and random draws
//! - [`selection`] - Pool, session state machine, input adapters and pick animation

pub mod deck;
pub mod selection;
