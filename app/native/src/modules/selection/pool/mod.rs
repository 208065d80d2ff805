//! The rotating pool of drawable items.
//!
//! Items sit at fixed angles around a ring that turns continuously. Picking
//! removes an item from pool membership and hides its visual; cancelling
//! restores the same item in place. Both are single synchronous calls, so no
//! caller can ever observe a half-removed item.

mod layout;

use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::Duration;

pub use layout::{RingLayout, RingSpeed};

use super::effects::{SceneSurface, VisualHandle};
use super::state::{Item, ItemId, Vec3};

/// Pool membership contract violations.
///
/// These indicate an ownership bug in the caller and are never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The item is not currently a member of the pool.
    #[error("Item {0} is not in the pool")]
    NotFound(ItemId),

    /// The item is already a member of the pool.
    #[error("Item {0} is already in the pool")]
    AlreadyPresent(ItemId),
}

/// A built position on the ring.
#[derive(Debug)]
struct Entry {
    item: Item,
    base_angle: f64,
    visual: VisualHandle,
    present: bool,
}

/// The ring of items available for picking.
pub struct RotatingPool {
    scene: Arc<dyn SceneSurface>,
    layout: RingLayout,
    /// Built entries; the position in this list is the stable index.
    entries: Vec<Entry>,
    index: HashMap<ItemId, usize>,
    radius: f64,
    rotation: f64,
    speed: RingSpeed,
    paused: bool,
    present: usize,
}

impl RotatingPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new(scene: Arc<dyn SceneSurface>, layout: RingLayout) -> Self {
        Self {
            scene,
            layout,
            entries: Vec::new(),
            index: HashMap::new(),
            radius: 0.0,
            rotation: 0.0,
            speed: RingSpeed::Normal,
            paused: false,
            present: 0,
        }
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Replaces the whole pool with `candidates`, in the given order.
    ///
    /// Old visuals are disposed and new ones created. Duplicate identities
    /// after the first are dropped. Callers must make sure no pick is in
    /// flight, since any pending item of an earlier build is no longer valid.
    pub fn rebuild(&mut self, candidates: Vec<Item>) {
        self.clear();

        let mut seen = HashSet::with_capacity(candidates.len());
        let unique: Vec<Item> = candidates
            .into_iter()
            .filter(|item| {
                let fresh = seen.insert(item.id);
                if !fresh {
                    tracing::warn!(item = %item.id, "dropping duplicate item from pool rebuild");
                }
                fresh
            })
            .collect();

        let count = unique.len();
        self.radius = self.layout.radius(count);
        self.entries.reserve(count);

        for (position, item) in unique.into_iter().enumerate() {
            let visual = self.scene.create_card(&item);
            let base_angle = RingLayout::base_angle(position, count);
            self.scene.set_position(
                visual,
                self.layout.world_position(base_angle, self.rotation, self.radius),
            );
            self.scene.set_visible(visual, true);

            self.index.insert(item.id, position);
            self.entries.push(Entry { item, base_angle, visual, present: true });
        }

        self.present = count;
        tracing::debug!(items = count, radius = self.radius, "pool rebuilt");
    }

    /// Disposes every visual and empties the pool.
    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            self.scene.dispose(entry.visual);
        }
        self.index.clear();
        self.present = 0;
    }

    /// Detaches `id` from the pool and hides its visual.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotFound`] if the item is not currently a member.
    pub fn remove(&mut self, id: ItemId) -> Result<Item, PoolError> {
        let entry = self
            .index
            .get(&id)
            .and_then(|&position| self.entries.get_mut(position))
            .filter(|entry| entry.present)
            .ok_or(PoolError::NotFound(id))?;

        entry.present = false;
        self.scene.set_visible(entry.visual, false);
        self.present -= 1;

        tracing::debug!(item = %id, remaining = self.present, "item removed from pool");
        Ok(entry.item.clone())
    }

    /// Re-attaches a previously removed item at its original place.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::AlreadyPresent`] if the item is already a member,
    /// or [`PoolError::NotFound`] if it never belonged to this build.
    pub fn restore(&mut self, id: ItemId) -> Result<(), PoolError> {
        let position = *self.index.get(&id).ok_or(PoolError::NotFound(id))?;
        let entry = &mut self.entries[position];
        if entry.present {
            return Err(PoolError::AlreadyPresent(id));
        }

        entry.present = true;
        self.scene.set_position(
            entry.visual,
            self.layout.world_position(entry.base_angle, self.rotation, self.radius),
        );
        self.scene.set_visible(entry.visual, true);
        self.present += 1;

        tracing::debug!(item = %id, remaining = self.present, "item restored to pool");
        Ok(())
    }

    /// Number of items currently in the pool.
    #[must_use]
    pub const fn len(&self) -> usize { self.present }

    /// Whether no item is currently in the pool.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.present == 0 }

    /// Whether `id` is currently a member.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.index.get(&id).is_some_and(|&position| self.entries[position].present)
    }

    /// Present items in stable order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.entries.iter().filter(|entry| entry.present).map(|entry| &entry.item)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The present item closest to `reference`.
    ///
    /// Ties are broken by the lowest stable index.
    #[must_use]
    pub fn query_nearest(&self, reference: Vec3) -> Option<&Item> {
        let mut nearest: Option<(f64, &Entry)> = None;

        for entry in self.entries.iter().filter(|entry| entry.present) {
            let distance = self.entry_position(entry).distance_squared(reference);
            if nearest.is_none_or(|(best, _)| distance < best) {
                nearest = Some((distance, entry));
            }
        }

        nearest.map(|(_, entry)| &entry.item)
    }

    /// Current world position of a present item.
    #[must_use]
    pub fn position_of(&self, id: ItemId) -> Option<Vec3> {
        let position = *self.index.get(&id)?;
        let entry = &self.entries[position];
        entry.present.then(|| self.entry_position(entry))
    }

    fn entry_position(&self, entry: &Entry) -> Vec3 {
        self.layout.world_position(entry.base_angle, self.rotation, self.radius)
    }

    // ========================================================================
    // Rotation
    // ========================================================================

    /// Advances the automatic rotation by `dt` and pushes positions to the scene.
    pub fn tick(&mut self, dt: Duration) {
        if !self.paused {
            let delta = self.layout.angular_speed(self.speed) * dt.as_secs_f64();
            self.rotation = (self.rotation + delta).rem_euclid(TAU);
        }

        self.sync_positions();
    }

    /// Turns the ring by `radians` regardless of the automatic rotation.
    pub fn nudge(&mut self, radians: f64) {
        self.rotation = (self.rotation + radians).rem_euclid(TAU);
        self.sync_positions();
    }

    fn sync_positions(&self) {
        for entry in self.entries.iter().filter(|entry| entry.present) {
            self.scene.set_position(entry.visual, self.entry_position(entry));
        }
    }

    pub fn set_speed(&mut self, speed: RingSpeed) {
        if self.speed != speed {
            tracing::trace!(?speed, "ring speed changed");
            self.speed = speed;
        }
    }

    #[must_use]
    pub const fn speed(&self) -> RingSpeed { self.speed }

    /// Suspends or resumes the automatic rotation.
    pub const fn set_paused(&mut self, paused: bool) { self.paused = paused; }

    #[must_use]
    pub const fn is_paused(&self) -> bool { self.paused }

    /// Current rotation angle in radians, in `[0, 2π)`.
    #[must_use]
    pub const fn rotation(&self) -> f64 { self.rotation }
}

impl Drop for RotatingPool {
    fn drop(&mut self) { self.clear(); }
}

impl std::fmt::Debug for RotatingPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingPool")
            .field("present", &self.present)
            .field("built", &self.entries.len())
            .field("rotation", &self.rotation)
            .field("speed", &self.speed)
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::selection::testing::{RecordingScene, items};

    fn pool_with(count: usize) -> (Arc<RecordingScene>, RotatingPool) {
        let scene = Arc::new(RecordingScene::default());
        let mut pool = RotatingPool::new(scene.clone(), RingLayout::default());
        pool.rebuild(items(count));
        (scene, pool)
    }

    #[test]
    fn test_rebuild_creates_visible_visuals() {
        let (scene, pool) = pool_with(12);
        assert_eq!(pool.len(), 12);
        assert_eq!(scene.live_cards(), 12);
        assert_eq!(scene.visible_cards(), 12);
    }

    #[test]
    fn test_rebuild_disposes_previous_visuals() {
        let (scene, mut pool) = pool_with(12);
        pool.rebuild(items(5));
        assert_eq!(pool.len(), 5);
        assert_eq!(scene.live_cards(), 5);
        assert_eq!(scene.disposed_count(), 12);
    }

    #[test]
    fn test_rebuild_drops_duplicate_ids() {
        let scene = Arc::new(RecordingScene::default());
        let mut pool = RotatingPool::new(scene, RingLayout::default());
        let mut candidates = items(3);
        candidates.push(candidates[0].clone());

        pool.rebuild(candidates);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_remove_hides_and_detaches() {
        let (scene, mut pool) = pool_with(12);
        let item = pool.remove(ItemId(3)).unwrap();

        assert_eq!(item.id, ItemId(3));
        assert_eq!(pool.len(), 11);
        assert!(!pool.contains(ItemId(3)));
        assert_eq!(scene.visible_cards(), 11);
    }

    #[test]
    fn test_remove_twice_is_not_found() {
        let (_scene, mut pool) = pool_with(4);
        pool.remove(ItemId(1)).unwrap();
        assert_eq!(pool.remove(ItemId(1)), Err(PoolError::NotFound(ItemId(1))));
        assert_eq!(pool.remove(ItemId(99)), Err(PoolError::NotFound(ItemId(99))));
    }

    #[test]
    fn test_restore_preserves_identity_and_place() {
        let (_scene, mut pool) = pool_with(8);
        let before = pool.position_of(ItemId(2)).unwrap();
        let removed = pool.remove(ItemId(2)).unwrap();

        pool.restore(removed.id).unwrap();
        assert_eq!(pool.len(), 8);
        assert_eq!(pool.position_of(ItemId(2)), Some(before));
        assert_eq!(pool.items().find(|item| item.id == ItemId(2)), Some(&removed));
    }

    #[test]
    fn test_double_restore_is_rejected() {
        let (_scene, mut pool) = pool_with(4);
        pool.remove(ItemId(0)).unwrap();
        pool.restore(ItemId(0)).unwrap();

        assert_eq!(pool.restore(ItemId(0)), Err(PoolError::AlreadyPresent(ItemId(0))));
        assert_eq!(pool.restore(ItemId(42)), Err(PoolError::NotFound(ItemId(42))));
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_query_nearest_picks_closest_to_reference() {
        let (_scene, pool) = pool_with(4);
        // Item 1 sits at +z (angle π/2), the side facing the camera.
        let nearest = pool.query_nearest(Vec3::new(0.0, -0.6, 7.7)).unwrap();
        assert_eq!(nearest.id, ItemId(1));
    }

    #[test]
    fn test_query_nearest_skips_removed_items() {
        let (_scene, mut pool) = pool_with(4);
        pool.remove(ItemId(1)).unwrap();

        let nearest = pool.query_nearest(Vec3::new(0.0, -0.6, 7.7)).unwrap();
        assert_ne!(nearest.id, ItemId(1));
    }

    #[test]
    fn test_query_nearest_breaks_ties_by_stable_index() {
        let (_scene, pool) = pool_with(2);
        // Two cards on opposite sides are equidistant from the ring center.
        let nearest = pool.query_nearest(Vec3::ZERO).unwrap();
        assert_eq!(nearest.id, ItemId(0));
    }

    #[test]
    fn test_query_nearest_on_empty_pool() {
        let (_scene, mut pool) = pool_with(1);
        pool.remove(ItemId(0)).unwrap();
        assert!(pool.query_nearest(Vec3::ZERO).is_none());
    }

    #[test]
    fn test_tick_rotates_by_speed() {
        let (_scene, mut pool) = pool_with(4);
        pool.tick(Duration::from_secs(15));
        assert!((pool.rotation() - TAU / 4.0).abs() < 1e-9);

        pool.set_speed(RingSpeed::Fast);
        pool.tick(Duration::from_millis(2500));
        assert!((pool.rotation() - TAU / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_paused_ring_only_moves_by_nudge() {
        let (_scene, mut pool) = pool_with(4);
        pool.set_paused(true);
        pool.tick(Duration::from_secs(10));
        assert!(pool.rotation().abs() < f64::EPSILON);

        pool.nudge(0.5);
        assert!((pool.rotation() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_changes_nearest_item() {
        let (_scene, mut pool) = pool_with(4);
        // A quarter turn brings item 2 (angle π) to the front.
        pool.tick(Duration::from_secs(15));
        let nearest = pool.query_nearest(Vec3::new(0.0, -0.6, 7.7)).unwrap();
        assert_eq!(nearest.id, ItemId(2));
    }

    #[test]
    fn test_drop_disposes_visuals() {
        let (scene, pool) = pool_with(6);
        drop(pool);
        assert_eq!(scene.live_cards(), 0);
    }
}
