//! The standard 78-card deck.

use super::card::{Arcana, CardInfo, Suit};
use crate::modules::selection::state::ItemId;

const MAJOR_ARCANA: [&str; 22] = [
    "The Fool",
    "The Magician",
    "The High Priestess",
    "The Empress",
    "The Emperor",
    "The Hierophant",
    "The Lovers",
    "The Chariot",
    "Strength",
    "The Hermit",
    "Wheel of Fortune",
    "Justice",
    "The Hanged Man",
    "Death",
    "Temperance",
    "The Devil",
    "The Tower",
    "The Star",
    "The Moon",
    "The Sun",
    "Judgement",
    "The World",
];

const RANKS: [&str; 14] = [
    "Ace", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Page",
    "Knight", "Queen", "King",
];

/// Builds the standard deck: major arcana first, then each suit Ace to King.
pub(super) fn standard_cards() -> Vec<CardInfo> {
    let majors = MAJOR_ARCANA.iter().enumerate().map(|(index, name)| (
        (*name).to_string(),
        Arcana::Major,
        None,
        format!("m{index:02}.jpg"),
    ));

    let minors = Suit::ALL.into_iter().flat_map(|suit| {
        RANKS.iter().enumerate().map(move |(index, rank)| (
            format!("{rank} of {}", suit.name()),
            Arcana::Minor,
            Some(suit),
            format!("{}{:02}.jpg", suit.prefix(), index + 1),
        ))
    });

    majors
        .chain(minors)
        .zip(0u32..)
        .map(|((name, arcana, suit, image_filename), id)| CardInfo {
            id: ItemId(id),
            name,
            name_cn: None,
            arcana,
            suit,
            image_filename,
        })
        .collect()
}
