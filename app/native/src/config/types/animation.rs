//! Pick animation configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::modules::selection::state::Vec3;

/// Easing function for time-based animations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EasingType {
    /// Linear interpolation (constant speed).
    Linear,
    /// Cubic ease-in: slow start, accelerates.
    EaseIn,
    /// Cubic ease-out: fast start, decelerates.
    #[default]
    EaseOut,
    /// Cubic ease-in-out: slow start and end.
    EaseInOut,
}

/// Timing and placement of the converge → reveal → dock sequence.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationConfig {
    /// Duration of the particle convergence towards the staging point.
    /// Default: 1500
    pub converge_ms: u64,

    /// Number of particles gathered for each pick.
    /// Default: 3000
    pub particle_count: usize,

    /// Maximum per-particle start delay as a fraction of the converge phase.
    /// Default: 0.3
    pub particle_delay: f64,

    /// Particle fade-out once the card is revealed.
    /// Default: 200
    pub fade_ms: u64,

    /// How long the revealed card stays at the staging point.
    /// Default: 600
    pub reveal_hold_ms: u64,

    /// Duration of the flight from the staging point to the slot.
    /// Default: 800
    pub dock_ms: u64,

    /// Duration of the particle scatter when a pick is cancelled.
    /// Default: 400
    pub disperse_ms: u64,

    /// Upper bound on waiting for the card artwork before falling back.
    /// Default: 5000
    pub load_timeout_ms: u64,

    /// Radius of the ambient particle scatter around the staging point.
    /// Default: 3.4
    pub scatter_radius: f64,

    /// Frame interval used by the animation loops.
    /// Default: 16
    pub frame_ms: u64,

    /// Where particles converge and the card is revealed.
    pub staging: Vec3,

    /// Slot positions for committed cards, in pick order.
    /// Picks beyond the configured slots wrap onto a new row above.
    pub slots: Vec<Vec3>,

    /// Vertical offset between slot rows.
    /// Default: 1.3
    pub slot_row_offset: f64,

    /// Easing for the converge phase.
    /// Default: "ease-out"
    pub converge_easing: EasingType,

    /// Easing for the dock phase.
    /// Default: "ease-in-out"
    pub dock_easing: EasingType,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            converge_ms: 1500,
            particle_count: 3000,
            particle_delay: 0.3,
            fade_ms: 200,
            reveal_hold_ms: 600,
            dock_ms: 800,
            disperse_ms: 400,
            load_timeout_ms: 5000,
            scatter_radius: 3.4,
            frame_ms: 16,
            staging: Vec3::new(0.0, -0.5, 0.5),
            slots: vec![
                Vec3::new(-2.4, -2.5, -1.0),
                Vec3::new(0.1, -2.5, -1.0),
                Vec3::new(2.4, -2.5, -1.0),
            ],
            slot_row_offset: 1.3,
            converge_easing: EasingType::EaseOut,
            dock_easing: EasingType::EaseInOut,
        }
    }
}

impl AnimationConfig {
    /// Returns the docked position for the given slot index.
    ///
    /// Slots past the configured list reuse the same columns one row higher.
    #[must_use]
    pub fn slot_position(&self, slot: usize) -> Vec3 {
        if self.slots.is_empty() {
            return self.staging;
        }

        let columns = self.slots.len();
        let base = self.slots[slot % columns];
        #[allow(clippy::cast_precision_loss)]
        let row = (slot / columns) as f64;
        Vec3::new(base.x, row.mul_add(self.slot_row_offset, base.y), base.z)
    }
}
