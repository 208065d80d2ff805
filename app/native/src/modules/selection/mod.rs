//! Selection core - turning noisy input into transactional picks.
//!
//! This module provides the card selection machinery using:
//! - Actor model with `tokio` channels for message passing
//! - `eyeball` observables for the published selection state
//! - One generation-guarded tokio task per pick animation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Input Sources                           │
//! │  (gesture classifier samples, pointer events, frame ticks)  │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ mpsc::Sender<SelectionMessage>
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Selection Actor                           │
//! │  - Input adapter (activation gate, grab timer, drag)        │
//! │  - Session state machine (pool, pending, committed)         │
//! │  - Publishes snapshots and finished draws                   │
//! └─────────────┬───────────────────────────────▲───────────────┘
//!               │ converge / commit / disperse  │ PipelineEvent
//!               ▼                               │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Animation Pipeline                          │
//! │  - Converge, reveal, dock per pick                          │
//! │  - Artwork loads raced against timers                       │
//! │  - Stale generations never touch the scene                  │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ SceneSurface
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   External Renderer                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod actor;
pub mod effects;
pub mod gesture;
pub mod input;
pub mod pool;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use actor::{
    ActorError, QueryResult, SelectionActor, SelectionActorHandle, SelectionContext,
    SelectionMessage, SelectionQuery, SelectionSnapshot,
};
pub use effects::{
    AnimationPipeline, Generation, LoadError, Material, PickAnimator, PipelineEvent, Resource,
    ResourceLoader, SceneSurface, VisualHandle,
};
pub use gesture::{GestureLabel, GestureSample};
pub use input::{InputAdapter, InputEvent, InputMode, PointerEvent};
pub use pool::{PoolError, RotatingPool};
pub use session::{
    FinalDraw, Outcome, Rejection, SelectionSession, SessionCommand, SessionError, SessionKind,
    SessionPhase, SessionPolicy,
};
pub use state::{Item, ItemId, Pick, Vec3};
