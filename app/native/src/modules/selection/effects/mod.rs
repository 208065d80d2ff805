//! Side effects of selection: scene mutations, artwork loading and animation.

pub mod animation;
mod loader;
mod scene;

pub use animation::{AnimationPipeline, Generation, PipelineEvent};
pub use loader::{LoadError, Resource, ResourceLoader};
pub use scene::{Material, SceneSurface, VisualHandle};

use crate::modules::selection::state::Item;

/// Runs the visual sequence of picks on behalf of a session.
///
/// A pick is started with [`converge`](Self::converge), which returns the
/// generation that owns it. Only that generation can be committed. Cancelling
/// or starting another pick makes it stale.
pub trait PickAnimator: Send {
    /// Starts animating `item` and returns the generation that owns it.
    fn converge(&mut self, item: &Item) -> Generation;

    /// Lets the pick of `generation` continue into reveal and dock.
    ///
    /// Returns `false` if the generation is no longer current.
    fn commit(&mut self, generation: Generation, slot: usize) -> bool;

    /// Abandons the current pick and scatters its particles. Idempotent.
    fn disperse(&mut self) -> Generation;

    /// Abandons everything, including docked cards.
    fn reset(&mut self);

    fn current(&self) -> Generation;
}
