//! Value types shared by the pool, the session and the animation pipeline.

mod types;

pub use types::{Item, ItemId, Pick, Vec3};
