//! Card catalogue.
//!
//! The deck is the source of every item dealt into the rotating pool. It is
//! either the built-in 78-card deck or loaded from a JSON/JSONC file shaped as
//! `{ "cards": [...] }`.

mod builtin;
mod card;

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

pub use card::{Arcana, CardInfo, Suit};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::config::DEFAULT_IMAGE_BASE_URL;
use crate::modules::selection::state::{Item, ItemId};

/// Errors that can occur when loading a deck.
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    /// The deck file could not be read.
    #[error("Failed to read deck file: {0}")]
    Io(#[from] std::io::Error),

    /// The deck file is not valid JSON.
    #[error("Failed to parse deck file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two cards share the same identity.
    #[error("Duplicate card id {0}")]
    DuplicateId(ItemId),

    /// The deck has no cards.
    #[error("Deck contains no cards")]
    Empty,
}

/// On-disk deck entry. Ids default to the card's position in the file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeckEntry {
    #[serde(default)]
    id: Option<u32>,
    name: String,
    #[serde(default, rename = "nameCN")]
    name_cn: Option<String>,
    arcana: Arcana,
    #[serde(default)]
    suit: Option<Suit>,
    image_filename: String,
}

#[derive(Debug, Deserialize)]
struct DeckFile {
    cards: Vec<DeckEntry>,
}

/// An ordered catalogue of cards plus the artwork location.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<CardInfo>,
    image_base_url: String,
}

impl Deck {
    /// The standard 78-card deck.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            cards: builtin::standard_cards(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        }
    }

    /// Creates a deck from already-built cards.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Empty`] for an empty list and
    /// [`DeckError::DuplicateId`] if two cards share an id.
    pub fn from_cards(cards: Vec<CardInfo>) -> Result<Self, DeckError> {
        if cards.is_empty() {
            return Err(DeckError::Empty);
        }

        let mut seen = HashSet::with_capacity(cards.len());
        if let Some(card) = cards.iter().find(|card| !seen.insert(card.id)) {
            return Err(DeckError::DuplicateId(card.id));
        }

        Ok(Self {
            cards,
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        })
    }

    /// Parses a deck from JSON or JSONC.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Parse`] for malformed input, or any error of
    /// [`Deck::from_cards`].
    pub fn from_reader(reader: impl Read) -> Result<Self, DeckError> {
        let file: DeckFile = serde_json::from_reader(json_comments::StripComments::new(reader))?;
        let cards = file
            .cards
            .into_iter()
            .zip(0u32..)
            .map(|(entry, position)| CardInfo {
                id: ItemId(entry.id.unwrap_or(position)),
                name: entry.name,
                name_cn: entry.name_cn,
                arcana: entry.arcana,
                suit: entry.suit,
                image_filename: entry.image_filename,
            })
            .collect();

        Self::from_cards(cards)
    }

    /// Loads a deck file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Io`] if the file cannot be opened, or any error of
    /// [`Deck::from_reader`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DeckError> {
        Self::from_reader(fs::File::open(path)?)
    }

    /// Replaces the artwork base URL.
    #[must_use]
    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into();
        self
    }

    /// Artwork base URL.
    #[must_use]
    pub fn image_base_url(&self) -> &str { &self.image_base_url }

    /// All cards in deck order.
    #[must_use]
    pub fn cards(&self) -> &[CardInfo] { &self.cards }

    /// Number of cards.
    #[must_use]
    pub fn len(&self) -> usize { self.cards.len() }

    /// Whether the deck has no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.cards.is_empty() }

    /// Looks up a card by id.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&CardInfo> { self.cards.iter().find(|card| card.id == id) }

    /// Full artwork URI of a card.
    #[must_use]
    pub fn image_uri(&self, card: &CardInfo) -> String { card.image_uri(&self.image_base_url) }

    /// Deals the shuffled pool candidates, leaving out `exclude`.
    ///
    /// Each item gets its own inverted roll.
    pub fn candidates<R: Rng + ?Sized>(
        &self,
        exclude: &HashSet<ItemId>,
        reverse_probability: f64,
        rng: &mut R,
    ) -> Vec<Item> {
        let probability = reverse_probability.clamp(0.0, 1.0);
        let mut items: Vec<Item> = self
            .cards
            .iter()
            .filter(|card| !exclude.contains(&card.id))
            .map(|card| Item::new(card.clone(), rng.random_bool(probability)))
            .collect();

        items.shuffle(rng);
        items
    }

    /// Draws `count` distinct random cards without involving the pool.
    ///
    /// Used by the intuition practice, which flips cards one by one.
    pub fn draw_random<R: Rng + ?Sized>(
        &self,
        count: usize,
        reverse_probability: f64,
        rng: &mut R,
    ) -> Vec<Item> {
        let mut items = self.candidates(&HashSet::new(), reverse_probability, rng);
        items.truncate(count);
        items
    }
}

impl Default for Deck {
    fn default() -> Self { Self::builtin() }
}
