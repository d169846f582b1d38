//! Deck generation.
//!
//! A deck is every card of a mode, enumerated in mixed-radix base order and
//! then permuted. With a seed the permutation is reproducible byte for byte,
//! which is what lets independent clients rebuild the same round.

use serde::{Deserialize, Serialize};

use super::card::Card;
use crate::core::{DeckRng, GameMode};

/// An ordered deck of cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
    seed: Option<u64>,
}

impl Deck {
    /// Every card of `mode` in base order (unshuffled).
    #[must_use]
    pub fn ordered(mode: &GameMode) -> Self {
        Self {
            cards: (0..mode.deck_size).map(|i| Card::from_index(i, mode)).collect(),
            seed: None,
        }
    }

    /// Generate a permuted deck.
    ///
    /// ```
    /// use set_engine::cards::Deck;
    /// use set_engine::core::{ModeId, ModeRegistry};
    ///
    /// let registry = ModeRegistry::standard();
    /// let mode = registry.get(ModeId::Normal).unwrap();
    /// let a = Deck::generate(mode, Some(42));
    /// let b = Deck::generate(mode, Some(42));
    /// assert_eq!(a, b);
    /// assert_eq!(a.len(), 81);
    /// ```
    #[must_use]
    pub fn generate(mode: &GameMode, seed: Option<u64>) -> Self {
        let mut deck = Self::ordered(mode);
        let mut rng = DeckRng::from_optional(seed);
        rng.shuffle(&mut deck.cards);
        deck.seed = seed;
        deck
    }

    /// Wrap an existing card order, e.g. one restored from a record.
    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards, seed: None }
    }

    /// Seed used to permute this deck, if it was seeded.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Cards in deck order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Consume into the card list.
    #[must_use]
    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }

    /// Number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the deck is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Digit-string encodings in deck order.
    #[must_use]
    pub fn encodings(&self) -> Vec<String> {
        self.cards.iter().map(Card::encode).collect()
    }
}
