//! Particle cloud used by the converge and disperse phases.

use std::f64::consts::TAU;

use rand::Rng;

use super::easing::{apply_easing, staggered};
use crate::config::EasingType;
use crate::modules::selection::state::Vec3;

/// Positions of one particle cloud.
///
/// Each particle remembers where it was scattered, so a cancelled pick can
/// send it back from wherever the converge left it.
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    origins: Vec<Vec3>,
    delays: Vec<f64>,
    current: Vec<Vec3>,
    anchor: Vec<Vec3>,
}

impl ParticleField {
    /// Scatters `count` particles in a band around `center`.
    ///
    /// Each particle gets a start delay in `[0, max_delay]`, as a fraction of
    /// the converge phase.
    pub fn scatter<R: Rng + ?Sized>(
        count: usize,
        center: Vec3,
        radius: f64,
        max_delay: f64,
        rng: &mut R,
    ) -> Self {
        let max_delay = max_delay.clamp(0.0, 1.0);
        let mut origins = Vec::with_capacity(count);
        let mut delays = Vec::with_capacity(count);

        for _ in 0..count {
            let angle = rng.random_range(0.0..TAU);
            let distance = radius * rng.random_range(0.8..=1.2);
            let height = rng.random_range(-0.5..=0.5);
            origins.push(center.add_scaled(Vec3::new(angle.cos(), height, angle.sin()), distance));
            delays.push(rng.random::<f64>() * max_delay);
        }

        Self { current: origins.clone(), anchor: origins.clone(), origins, delays }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.current.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.current.is_empty() }

    /// Current particle positions.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] { &self.current }

    /// Moves particles towards `target` at phase `progress`.
    pub fn converge(&mut self, target: Vec3, progress: f64, easing: EasingType) {
        for ((current, origin), delay) in self.current.iter_mut().zip(&self.origins).zip(&self.delays)
        {
            let t = apply_easing(staggered(progress, *delay), easing);
            *current = origin.lerp(target, t);
        }
    }

    /// Freezes the current positions as the starting point of a disperse.
    pub fn begin_disperse(&mut self) { self.anchor.clone_from(&self.current); }

    /// Moves particles from the frozen positions back to their scatter origins.
    pub fn disperse(&mut self, progress: f64) {
        let t = apply_easing(progress, EasingType::EaseOut);
        for ((current, anchor), origin) in self.current.iter_mut().zip(&self.anchor).zip(&self.origins)
        {
            *current = anchor.lerp(*origin, t);
        }
    }
}
