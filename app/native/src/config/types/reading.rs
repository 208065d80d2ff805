//! Reading (draw) configuration types.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default location of the card artwork.
pub const DEFAULT_IMAGE_BASE_URL: &str =
    "https://raw.githubusercontent.com/metabismuth/tarot-json/master/cards/";

/// How many cards a reading draws and how they are dealt.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ReadingConfig {
    /// Number of cards drawn in a primary reading.
    /// Default: 3
    pub card_count: usize,

    /// Number of cards drawn by a supplemental pick.
    /// Default: 2
    pub supplement_count: usize,

    /// Probability that a dealt card is inverted.
    /// Default: 0.3
    pub reverse_probability: f64,

    /// Base URL prepended to each card's image filename.
    pub image_base_url: String,

    /// Optional deck file (JSON or JSONC). The built-in 78-card deck is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_path: Option<PathBuf>,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            card_count: 3,
            supplement_count: 2,
            reverse_probability: 0.3,
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            deck_path: None,
        }
    }
}

impl ReadingConfig {
    /// Reverse probability clamped to a valid range.
    #[must_use]
    pub fn reverse_probability(&self) -> f64 { self.reverse_probability.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_probability_is_clamped() {
        let config = ReadingConfig { reverse_probability: 1.7, ..Default::default() };
        assert!((config.reverse_probability() - 1.0).abs() < f64::EPSILON);

        let config = ReadingConfig { reverse_probability: -0.2, ..Default::default() };
        assert!(config.reverse_probability().abs() < f64::EPSILON);
    }

    #[test]
    fn test_deck_path_is_optional() {
        let config: ReadingConfig = serde_json::from_str(r#"{ "cardCount": 5 }"#).unwrap();
        assert_eq!(config.card_count, 5);
        assert!(config.deck_path.is_none());
        assert_eq!(config.image_base_url, DEFAULT_IMAGE_BASE_URL);
    }
}
