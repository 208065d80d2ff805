//! Ring geometry and rotation speed.

use std::f64::consts::TAU;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::RingConfig;
use crate::modules::selection::state::Vec3;

/// Rotation speed requested by the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RingSpeed {
    #[default]
    Normal,
    /// While picking is armed.
    Fast,
    /// While a pick is in flight.
    Slow,
}

/// Placement of cards around the ring.
#[derive(Debug, Clone, PartialEq)]
pub struct RingLayout {
    pitch: f64,
    scale: f64,
    center: Vec3,
    normal: Duration,
    fast: Duration,
    slow: Duration,
}

impl RingLayout {
    #[must_use]
    pub fn from_config(config: &RingConfig) -> Self {
        Self {
            pitch: config.card_width + config.card_spacing,
            scale: config.group_scale,
            center: config.center,
            normal: config.normal_period(),
            fast: config.fast_period(),
            slow: config.slow_period(),
        }
    }

    /// Ring radius for `count` cards laid edge to edge.
    #[must_use]
    pub fn radius(&self, count: usize) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let circumference = count as f64 * self.pitch;
        circumference / TAU
    }

    /// Angle of the card at `index` out of `count`.
    #[must_use]
    pub fn base_angle(index: usize, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }

        #[allow(clippy::cast_precision_loss)]
        let fraction = index as f64 / count as f64;
        fraction * TAU
    }

    /// World position of a card at `base_angle` once the ring has turned by `rotation`.
    ///
    /// The ring turns around the vertical axis, so a positive rotation moves
    /// cards towards lower angles.
    #[must_use]
    pub fn world_position(&self, base_angle: f64, rotation: f64, radius: f64) -> Vec3 {
        let angle = base_angle - rotation;
        let local = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
        self.center.add_scaled(local, self.scale)
    }

    /// Angular speed in radians per second.
    #[must_use]
    pub fn angular_speed(&self, speed: RingSpeed) -> f64 {
        let period = match speed {
            RingSpeed::Normal => self.normal,
            RingSpeed::Fast => self.fast,
            RingSpeed::Slow => self.slow,
        };

        if period.is_zero() { 0.0 } else { TAU / period.as_secs_f64() }
    }
}

impl Default for RingLayout {
    fn default() -> Self { Self::from_config(&RingConfig::default()) }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    #[test]
    fn test_radius_grows_with_card_count() {
        let layout = RingLayout::default();
        let expected = 78.0 * 0.92 / TAU;
        assert!((layout.radius(78) - expected).abs() < 1e-9);
        assert!(layout.radius(12) < layout.radius(78));
    }

    #[test]
    fn test_base_angles_are_evenly_spaced() {
        assert!(RingLayout::base_angle(0, 4).abs() < f64::EPSILON);
        assert!((RingLayout::base_angle(1, 4) - FRAC_PI_2).abs() < 1e-12);
        assert!((RingLayout::base_angle(2, 4) - PI).abs() < 1e-12);
        assert!(RingLayout::base_angle(3, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_world_position_applies_rotation_and_scale() {
        let layout = RingLayout::default();
        let position = layout.world_position(FRAC_PI_2, FRAC_PI_2, 10.0);
        assert!((position.x - 3.0).abs() < 1e-9);
        assert!(position.z.abs() < 1e-9);
    }

    #[test]
    fn test_angular_speed_per_mode() {
        let layout = RingLayout::default();
        assert!((layout.angular_speed(RingSpeed::Normal) - TAU / 60.0).abs() < 1e-12);
        assert!((layout.angular_speed(RingSpeed::Fast) - TAU / 10.0).abs() < 1e-12);
        assert!(layout.angular_speed(RingSpeed::Slow) < layout.angular_speed(RingSpeed::Normal));
    }

    #[test]
    fn test_zero_period_stops_rotation() {
        let config = RingConfig { fast_period_ms: 0, ..Default::default() };
        let layout = RingLayout::from_config(&config);
        assert!(layout.angular_speed(RingSpeed::Fast).abs() < f64::EPSILON);
    }
}
