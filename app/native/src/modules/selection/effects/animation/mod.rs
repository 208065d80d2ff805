//! Pick animation: particle convergence, reveal and docking.
//!
//! # Architecture
//!
//! ```text
//! converge(item) ──► run task (gN) ──► converge frames ──► wait commit
//!                                                            │
//!                         disperse() advances gN ◄── cancel ─┤
//!                                                            ▼
//!                                       fade ──► swap material ──► dock ──► Docked
//! ```
//!
//! Every frame checks the captured generation under the stage lock before
//! mutating the scene.

mod easing;
mod generation;
mod particles;
mod pipeline;

pub use easing::{apply_easing, staggered};
pub use generation::{Generation, GenerationCounter};
pub use particles::ParticleField;
pub use pipeline::{AnimationPipeline, PipelineEvent, StaleGeneration};
