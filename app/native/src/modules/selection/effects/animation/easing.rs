//! Easing functions for time-based animations.
//!
//! Provides standard cubic curves: linear, ease-in, ease-out, and ease-in-out.

use crate::config::EasingType;

// ============================================================================
// Easing Functions
// ============================================================================

/// Linear easing (no acceleration).
#[inline]
pub const fn ease_linear(t: f64) -> f64 { t }

/// Ease-in (slow start, accelerates).
#[inline]
pub fn ease_in(t: f64) -> f64 { t * t * t }

/// Ease-out (fast start, decelerates).
#[inline]
pub fn ease_out(t: f64) -> f64 {
    let t1 = t - 1.0;
    (t1 * t1).mul_add(t1, 1.0)
}

/// Ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let t1 = 2.0f64.mul_add(t, -2.0);
        (0.5 * t1 * t1).mul_add(t1, 1.0)
    }
}

/// Applies an easing function to `t`, clamped to `[0, 1]` first.
#[inline]
pub fn apply_easing(t: f64, easing: EasingType) -> f64 {
    let t = t.clamp(0.0, 1.0);
    match easing {
        EasingType::Linear => ease_linear(t),
        EasingType::EaseIn => ease_in(t),
        EasingType::EaseOut => ease_out(t),
        EasingType::EaseInOut => ease_in_out(t),
    }
}

/// Progress of a phase that started `delay` into the timeline, in `[0, 1]`.
///
/// Used to stagger particles: each one waits for its delay, then covers the
/// rest of the timeline.
#[inline]
pub fn staggered(progress: f64, delay: f64) -> f64 {
    if delay >= 1.0 {
        return if progress >= 1.0 { 1.0 } else { 0.0 };
    }

    ((progress - delay) / (1.0 - delay)).clamp(0.0, 1.0)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_in_is_back_loaded() {
        assert!(ease_in(0.0).abs() < f64::EPSILON);
        assert!(ease_in(0.5) < 0.5);
        assert!((ease_in(1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ease_out_is_front_loaded() {
        assert!(ease_out(0.0).abs() < f64::EPSILON);
        assert!(ease_out(0.5) > 0.5);
        assert!((ease_out(1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ease_in_out_is_symmetric() {
        assert!((ease_in_out(0.5) - 0.5).abs() < f64::EPSILON);
        assert!(ease_in_out(0.25) < 0.25);
        assert!(ease_in_out(0.75) > 0.75);
        assert!((ease_in_out(0.2) + ease_in_out(0.8) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_apply_easing_clamps_input() {
        assert!((apply_easing(1.7, EasingType::EaseOut) - 1.0).abs() < f64::EPSILON);
        assert!(apply_easing(-0.3, EasingType::EaseIn).abs() < f64::EPSILON);
        assert!((apply_easing(0.5, EasingType::Linear) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_staggered_waits_for_delay() {
        assert!(staggered(0.2, 0.3).abs() < f64::EPSILON);
        assert!((staggered(0.65, 0.3) - 0.5).abs() < 1e-12);
        assert!((staggered(1.0, 0.3) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_staggered_with_full_delay_jumps_at_end() {
        assert!(staggered(0.99, 1.0).abs() < f64::EPSILON);
        assert!((staggered(1.0, 1.0) - 1.0).abs() < f64::EPSILON);
    }
}
