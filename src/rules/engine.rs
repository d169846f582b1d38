//! Matching engine: conjugates, set predicates, and board enumeration.
//!
//! Everything here is a pure function of its inputs. Enumeration order is
//! part of the contract: combinations are visited in strictly increasing
//! lexicographic index order, so "the first match" is stable everywhere.

use serde::{Deserialize, Serialize};

use super::combinations::{Combinations, IndexCombo};
use super::rule::MatchRule;
use crate::cards::Card;
use crate::core::GameMode;

/// The three ways to split four cards into two unordered pairs.
const ULTRA_PARTITIONS: [[(usize, usize); 2]; 3] = [
    [(0, 1), (2, 3)],
    [(0, 2), (1, 3)],
    [(0, 3), (1, 2)],
];

/// Which pairing made a four-card ULTRA match work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UltraDecomposition {
    /// The shared conjugate of both pairs.
    pub conjugate: Card,
    /// First pair, in claim order.
    pub first: (Card, Card),
    /// Second pair, in claim order.
    pub second: (Card, Card),
}

/// The card completing a normal set with `a` and `b`.
///
/// Per trait: equal inputs keep their value, different inputs give the
/// remaining third value.
///
/// Panics unless every trait of `mode` has exactly three variants.
#[must_use]
pub fn conjugate(a: &Card, b: &Card, mode: &GameMode) -> Card {
    assert!(
        mode.is_ternary(),
        "conjugate is only defined for 3-variant traits (mode {})",
        mode.id
    );
    Card::from_traits(
        a.traits()
            .iter()
            .zip(b.traits())
            .map(|(&x, &y)| if x == y { x } else { 3 - x - y }),
    )
}

/// Per-trait `(a + b + c) mod variants`.
#[must_use]
pub fn conjugate4(a: &Card, b: &Card, c: &Card, mode: &GameMode) -> Card {
    Card::from_traits((0..mode.trait_count()).map(|i| {
        let sum = a.trait_value(i) as u16 + b.trait_value(i) as u16 + c.trait_value(i) as u16;
        (sum % mode.variants(i) as u16) as u8
    }))
}

/// Check whether `cards` form a match under `rule`.
///
/// Wrong card counts, repeated cards, and cards that do not belong to the
/// mode are simply not matches.
#[must_use]
pub fn is_valid_set(cards: &[Card], rule: MatchRule, mode: &GameMode) -> bool {
    if !rule.accepts_count(cards.len()) {
        return false;
    }
    if cards.iter().enumerate().any(|(i, c)| cards[..i].contains(c)) {
        return false;
    }
    if cards.iter().any(|c| c.check(mode).is_err()) {
        return false;
    }

    match rule {
        MatchRule::Normal => is_normal_set(cards, mode),
        MatchRule::XorSet => (0..mode.trait_count())
            .all(|i| cards.iter().fold(0u8, |acc, c| acc ^ c.trait_value(i)) == 0),
        MatchRule::Ultra => ultra_partition(cards, mode).is_some(),
        // Two-card ghost claims are accepted structurally; whether the ghost
        // card exists is not checked at this layer.
        MatchRule::Ghost => cards.len() == 2 || is_normal_set(cards, mode),
    }
}

fn is_normal_set(cards: &[Card], mode: &GameMode) -> bool {
    cards.len() == 3
        && (0..mode.trait_count()).all(|i| {
            let sum: u16 = cards.iter().map(|c| c.trait_value(i) as u16).sum();
            sum % mode.variants(i) as u16 == 0
        })
}

fn ultra_partition(cards: &[Card], mode: &GameMode) -> Option<([(usize, usize); 2], Card)> {
    if cards.len() != 4 {
        return None;
    }
    ULTRA_PARTITIONS.iter().find_map(|&[(a, b), (c, d)]| {
        let left = conjugate(&cards[a], &cards[b], mode);
        let right = conjugate(&cards[c], &cards[d], mode);
        (left == right).then_some(([(a, b), (c, d)], left))
    })
}

/// Explain a four-card ULTRA match.
///
/// Returns `None` exactly when `cards` is not a valid ULTRA set. Partitions
/// are tried in the order (01|23), (02|13), (03|12).
#[must_use]
pub fn ultra_decomposition(cards: &[Card], mode: &GameMode) -> Option<UltraDecomposition> {
    if !is_valid_set(cards, MatchRule::Ultra, mode) {
        return None;
    }
    let ([(a, b), (c, d)], conjugate) = ultra_partition(cards, mode)?;
    Some(UltraDecomposition {
        conjugate,
        first: (cards[a].clone(), cards[b].clone()),
        second: (cards[c].clone(), cards[d].clone()),
    })
}

fn matches_iter<'a>(
    board: &'a [Card],
    rule: MatchRule,
    mode: &'a GameMode,
) -> impl Iterator<Item = IndexCombo> + 'a {
    let mut scratch: Vec<Card> = Vec::with_capacity(rule.enumeration_arity());
    Combinations::new(board.len(), rule.enumeration_arity()).filter(move |combo| {
        scratch.clear();
        scratch.extend(combo.iter().map(|&i| board[i].clone()));
        is_valid_set(&scratch, rule, mode)
    })
}

/// Every valid combination on `board`, in increasing lexicographic order.
#[must_use]
pub fn find_all_matches(board: &[Card], rule: MatchRule, mode: &GameMode) -> Vec<IndexCombo> {
    matches_iter(board, rule, mode).collect()
}

/// The lexicographically first match on `board`, if any (the hint).
#[must_use]
pub fn first_match(board: &[Card], rule: MatchRule, mode: &GameMode) -> Option<IndexCombo> {
    matches_iter(board, rule, mode).next()
}

/// Check whether `board` holds at least one match.
#[must_use]
pub fn has_match(board: &[Card], rule: MatchRule, mode: &GameMode) -> bool {
    first_match(board, rule, mode).is_some()
}

/// Offset of the first `mode.board_size` window of `deck` holding a match.
#[must_use]
pub fn find_board_offset(deck: &[Card], mode: &GameMode, rule: MatchRule) -> Option<usize> {
    if deck.len() < mode.board_size {
        return None;
    }
    (0..=deck.len() - mode.board_size)
        .find(|&start| has_match(&deck[start..start + mode.board_size], rule, mode))
}

/// The first board-sized window of `deck` that contains a match.
///
/// Falls back to the first `board_size` cards (which may hold no match) when
/// no window does.
#[must_use]
pub fn find_board(deck: &[Card], mode: &GameMode, rule: MatchRule) -> Vec<Card> {
    let size = mode.board_size.min(deck.len());
    let start = find_board_offset(deck, mode, rule).unwrap_or(0);
    deck[start..start + size].to_vec()
}
