//! Scene mutation surface.
//!
//! The renderer lives outside this crate. Everything the selection core does
//! to the screen goes through [`SceneSurface`], using opaque handles for the
//! visual objects it created.

use super::loader::Resource;
use crate::modules::selection::state::{Item, Vec3};

/// Opaque handle to a visual object owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(pub u64);

/// Material applied to a card visual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Material {
    /// The shared card-back texture.
    CardBack,
    /// Built-in artwork shown when the real artwork is unavailable.
    Fallback,
    /// Loaded card artwork.
    Artwork(Resource),
}

/// Mutations the selection core performs on the external scene graph.
///
/// Implementations must be cheap to call from any task; the core never holds
/// them across a suspension point.
pub trait SceneSurface: Send + Sync {
    /// Creates a hidden card visual showing the card back.
    fn create_card(&self, item: &Item) -> VisualHandle;

    /// Creates a hidden particle cloud with `count` points.
    fn create_particles(&self, count: usize) -> VisualHandle;

    fn set_position(&self, handle: VisualHandle, position: Vec3);

    /// Moves every point of a particle cloud.
    fn set_particle_positions(&self, handle: VisualHandle, positions: &[Vec3]);

    fn set_opacity(&self, handle: VisualHandle, opacity: f64);

    fn set_visible(&self, handle: VisualHandle, visible: bool);

    fn swap_material(&self, handle: VisualHandle, material: Material);

    /// Releases a visual. The handle must not be used afterwards.
    fn dispose(&self, handle: VisualHandle);
}
