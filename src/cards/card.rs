//! Card value type.
//!
//! A `Card` is a fixed-length vector of trait values. Its external form is a
//! digit string with one decimal digit per trait ("0120" is trait 0 = 0,
//! trait 1 = 1, ...). Cards are immutable once built.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::core::GameMode;

/// Trait storage; six inline slots cover every built-in mode.
pub type Traits = SmallVec<[u8; 6]>;

/// Card decoding errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("encoding has {got} traits, mode expects {expected}")]
    WrongLength { expected: usize, got: usize },
    #[error("character {ch:?} at position {index} is not a digit")]
    NotADigit { index: usize, ch: char },
    #[error("trait {index} value {value} outside 0..{variants}")]
    OutOfRange { index: usize, value: u8, variants: u8 },
    #[error("empty card encoding")]
    Empty,
}

/// An immutable card.
///
/// Equality and ordering follow the trait sequence.
///
/// ```
/// use set_engine::cards::Card;
///
/// let card = Card::parse("0120").unwrap();
/// assert_eq!(card.traits(), &[0, 1, 2, 0]);
/// assert_eq!(card.to_string(), "0120");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Card {
    traits: Traits,
}

impl Card {
    /// Build a card from trait values, checked against a mode.
    pub fn new(traits: &[u8], mode: &GameMode) -> Result<Self, CardError> {
        let card = Self::from_traits(traits.iter().copied());
        card.check(mode)?;
        Ok(card)
    }

    /// Build a card without mode checks.
    pub(crate) fn from_traits(traits: impl IntoIterator<Item = u8>) -> Self {
        Self {
            traits: traits.into_iter().collect(),
        }
    }

    /// Parse a digit string without a mode (any decimal digits accepted).
    pub fn parse(encoding: &str) -> Result<Self, CardError> {
        if encoding.is_empty() {
            return Err(CardError::Empty);
        }
        let traits = encoding
            .chars()
            .enumerate()
            .map(|(index, ch)| {
                ch.to_digit(10)
                    .map(|d| d as u8)
                    .ok_or(CardError::NotADigit { index, ch })
            })
            .collect::<Result<Traits, _>>()?;
        Ok(Self { traits })
    }

    /// Parse a digit string and check it against a mode.
    pub fn decode(encoding: &str, mode: &GameMode) -> Result<Self, CardError> {
        let card = Self::parse(encoding)?;
        card.check(mode)?;
        Ok(card)
    }

    /// Check arity and per-trait ranges against a mode.
    pub fn check(&self, mode: &GameMode) -> Result<(), CardError> {
        if self.traits.len() != mode.trait_count() {
            return Err(CardError::WrongLength {
                expected: mode.trait_count(),
                got: self.traits.len(),
            });
        }
        for (index, (&value, &variants)) in
            self.traits.iter().zip(mode.trait_variants.iter()).enumerate()
        {
            if value >= variants {
                return Err(CardError::OutOfRange {
                    index,
                    value,
                    variants,
                });
            }
        }
        Ok(())
    }

    /// The digit-string encoding.
    #[must_use]
    pub fn encode(&self) -> String {
        self.traits.iter().map(|&d| char::from(b'0' + d)).collect()
    }

    /// Trait values.
    #[must_use]
    pub fn traits(&self) -> &[u8] {
        &self.traits
    }

    /// Value of trait `index`.
    #[must_use]
    pub fn trait_value(&self, index: usize) -> u8 {
        self.traits[index]
    }

    /// Number of traits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    /// True for a card with no traits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Position of this card in the mode's mixed-radix base order.
    ///
    /// The last trait is the least significant digit.
    #[must_use]
    pub fn index_in(&self, mode: &GameMode) -> usize {
        self.traits
            .iter()
            .zip(mode.trait_variants.iter())
            .fold(0, |acc, (&value, &variants)| acc * variants as usize + value as usize)
    }

    /// Inverse of [`Card::index_in`].
    #[must_use]
    pub fn from_index(mut index: usize, mode: &GameMode) -> Self {
        let mut traits: Traits = SmallVec::from_elem(0, mode.trait_count());
        for (slot, &variants) in traits.iter_mut().zip(mode.trait_variants.iter()).rev() {
            *slot = (index % variants as usize) as u8;
            index /= variants as usize;
        }
        Self { traits }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.encode()
    }
}

impl TryFrom<String> for Card {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Card::parse(&value)
    }
}

impl std::str::FromStr for Card {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Card::parse(s)
    }
}
