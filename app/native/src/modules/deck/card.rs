//! Card descriptors.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::modules::selection::state::ItemId;

/// Which half of the deck a card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Arcana {
    Major,
    Minor,
}

/// Suit of a minor arcana card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Wands,
    Cups,
    Swords,
    Pentacles,
}

impl Suit {
    /// All suits in deck order.
    pub const ALL: [Self; 4] = [Self::Wands, Self::Cups, Self::Swords, Self::Pentacles];

    /// Image filename prefix used by the artwork set.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Wands => 'w',
            Self::Cups => 'c',
            Self::Swords => 's',
            Self::Pentacles => 'p',
        }
    }

    /// Display name of the suit.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wands => "Wands",
            Self::Cups => "Cups",
            Self::Swords => "Swords",
            Self::Pentacles => "Pentacles",
        }
    }
}

/// Display payload of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardInfo {
    /// Stable identity, unique within a deck.
    pub id: ItemId,

    /// English card name.
    pub name: String,

    /// Localized display name, when the deck provides one.
    #[serde(default, rename = "nameCN", skip_serializing_if = "Option::is_none")]
    pub name_cn: Option<String>,

    pub arcana: Arcana,

    /// Suit for minor arcana; `None` for major arcana.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suit: Option<Suit>,

    /// Artwork file name, relative to the image base URL.
    pub image_filename: String,
}

impl CardInfo {
    /// Full artwork URI for this card.
    #[must_use]
    pub fn image_uri(&self, base_url: &str) -> String {
        if base_url.is_empty() || base_url.ends_with('/') {
            format!("{base_url}{}", self.image_filename)
        } else {
            format!("{base_url}/{}", self.image_filename)
        }
    }

    /// Name to show to the user, preferring the localized one.
    #[must_use]
    pub fn display_name(&self) -> &str { self.name_cn.as_deref().unwrap_or(&self.name) }
}
