//! Core value types for the selection state.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::modules::deck::CardInfo;

// ============================================================================
// Identity
// ============================================================================

/// Stable identity of a drawable item.
///
/// Identities survive pool rebuilds, so they can be used to exclude items
/// that were drawn by an earlier session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

// ============================================================================
// Geometry
// ============================================================================

/// A point in scene space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self { Self { x, y, z } }

    /// Squared euclidean distance to `other`.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy))
    }

    /// Linear interpolation towards `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            (other.x - self.x).mul_add(t, self.x),
            (other.y - self.y).mul_add(t, self.y),
            (other.z - self.z).mul_add(t, self.z),
        )
    }

    /// Returns `self + other * scale`.
    #[must_use]
    pub fn add_scaled(self, other: Self, scale: f64) -> Self {
        Self::new(
            other.x.mul_add(scale, self.x),
            other.y.mul_add(scale, self.y),
            other.z.mul_add(scale, self.z),
        )
    }
}

// ============================================================================
// Items and picks
// ============================================================================

/// A card dealt into the pool.
///
/// The `inverted` flag is rolled once when the pool is built and stays with
/// the item through cancel and restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub card: CardInfo,
    pub inverted: bool,
}

impl Item {
    /// Creates an item for the given card.
    #[must_use]
    pub fn new(card: CardInfo, inverted: bool) -> Self { Self { id: card.id, card, inverted } }
}

/// A committed pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub item: Item,

    /// Slot the card was docked into.
    pub slot: usize,

    /// Whether the reveal used the fallback artwork.
    pub degraded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_squared() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 6.0, 3.0);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Vec3::new(0.0, -0.5, 0.5);
        let b = Vec3::new(2.4, -2.5, -1.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn test_add_scaled() {
        let center = Vec3::new(1.0, 0.0, 0.0);
        let offset = Vec3::new(10.0, 0.0, -10.0);
        assert_eq!(center.add_scaled(offset, 0.5), Vec3::new(6.0, 0.0, -5.0));
    }

    #[test]
    fn test_item_id_display() {
        assert_eq!(ItemId(7).to_string(), "#7");
    }
}
