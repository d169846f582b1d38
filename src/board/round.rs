//! Round state and board maintenance.
//!
//! The working deck is a single ordered sequence; the board is its first
//! `board_size` cards. Accepted matches remove cards from the board and pull
//! replacements from just past the window, after which the board is resized:
//! start from the mode's minimum and grow by the mode's step until a match
//! shows up or the whole deck is visible.
//!
//! Uses `im::Vector` so snapshots of a round clone in O(1).

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::cards::{Card, Deck};
use crate::core::GameMode;
use crate::rules::{
    find_all_matches, find_board_offset, first_match, has_match, is_valid_set, IndexCombo,
    MatchRule,
};

/// The explicit state of one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    mode: GameMode,
    rule: MatchRule,
    deck: Vector<Card>,
    board_size: usize,
    completed: bool,
}

impl RoundState {
    /// Start a round from a deck in its given order (board = prefix).
    ///
    /// Panics if `mode` is invalid or does not support `rule`.
    #[must_use]
    pub fn new(mode: &GameMode, rule: MatchRule, cards: Vec<Card>) -> Self {
        mode.assert_valid();
        assert!(
            mode.supports(rule),
            "Mode {} does not support rule {}",
            mode.id,
            rule
        );
        let mut state = Self {
            mode: mode.clone(),
            rule,
            deck: cards.into_iter().collect(),
            board_size: 0,
            completed: false,
        };
        state.adjust_board_size();
        state
    }

    /// Deal the opening board.
    ///
    /// The first board-sized window of the deck that holds a match is moved
    /// to the front, keeping the relative order of everything else. Without
    /// such a window the deck is used as is.
    #[must_use]
    pub fn deal(mode: &GameMode, rule: MatchRule, deck: Deck) -> Self {
        let mut cards = deck.into_cards();
        if let Some(offset) = find_board_offset(&cards, mode, rule) {
            cards[..offset + mode.board_size].rotate_left(offset);
        }
        Self::new(mode, rule, cards)
    }

    /// The mode this round is played in.
    #[must_use]
    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    /// The rule this round is played with.
    #[must_use]
    pub fn rule(&self) -> MatchRule {
        self.rule
    }

    /// Number of visible cards.
    #[must_use]
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    /// Visible cards, in board order.
    #[must_use]
    pub fn board(&self) -> Vec<Card> {
        self.deck.iter().take(self.board_size).cloned().collect()
    }

    /// Every card still in play (board first), in deck order.
    #[must_use]
    pub fn deck(&self) -> Vec<Card> {
        self.deck.iter().cloned().collect()
    }

    /// Cards still in play, including the board.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.deck.len()
    }

    /// Board position of `card`, if it is visible.
    #[must_use]
    pub fn board_position(&self, card: &Card) -> Option<usize> {
        self.deck.iter().take(self.board_size).position(|c| c == card)
    }

    /// All matches on the current board.
    #[must_use]
    pub fn matches(&self) -> Vec<IndexCombo> {
        find_all_matches(&self.board(), self.rule, &self.mode)
    }

    /// Cards of the lexicographically first match on the board.
    #[must_use]
    pub fn hint(&self) -> Option<Vec<Card>> {
        let board = self.board();
        first_match(&board, self.rule, &self.mode)
            .map(|combo| combo.iter().map(|&i| board[i].clone()).collect())
    }

    /// Try to take `cards` off the board as a match.
    ///
    /// Returns `true` if the round changed. Claims are refused (returning
    /// `false`, state untouched) when the round is completed, a card repeats,
    /// a card is not on the board, or the cards are not a match.
    pub fn apply_match(&mut self, cards: &[Card]) -> bool {
        if self.completed {
            return false;
        }
        if cards
            .iter()
            .enumerate()
            .any(|(i, card)| cards[..i].contains(card))
        {
            return false;
        }
        let Some(mut positions) = cards
            .iter()
            .map(|card| self.board_position(card))
            .collect::<Option<Vec<usize>>>()
        else {
            return false;
        };
        if !is_valid_set(cards, self.rule, &self.mode) {
            return false;
        }

        let matched = positions.len();
        if matched == self.board_size {
            self.deck = self.deck.skip(matched);
        } else {
            positions.sort_unstable();
            let tail_len = self.deck.len() - self.board_size;
            let kept = self.board_size - matched;
            let refill = matched
                .min(self.mode.board_size.saturating_sub(kept))
                .min(tail_len);

            let mut board: Vec<Option<Card>> =
                self.deck.iter().take(self.board_size).cloned().map(Some).collect();
            let replacements = self.deck.iter().skip(self.board_size).take(refill).cloned();
            for (&pos, card) in positions.iter().zip(replacements) {
                board[pos] = Some(card);
            }
            for &pos in &positions[refill..] {
                board[pos] = None;
            }

            let mut deck: Vector<Card> = board.into_iter().flatten().collect();
            deck.append(self.deck.skip(self.board_size + refill));
            self.deck = deck;
        }

        self.adjust_board_size();
        true
    }

    /// Resize the board: minimum size first, growing until a match exists or
    /// the whole deck is visible.
    pub fn adjust_board_size(&mut self) {
        let cards = self.deck();
        let mut size = self.mode.board_size.min(cards.len());
        while size < cards.len() && !has_match(&cards[..size], self.rule, &self.mode) {
            size = (size + self.mode.growth_step).min(cards.len());
            trace!(size, remaining = cards.len(), "growing board");
        }
        self.board_size = size;
    }

    /// No match on the board and nothing left to deal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.board_size >= self.deck.len() && !has_match(&self.board(), self.rule, &self.mode)
    }

    /// Whether completion has fired.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Mark the round completed if it is terminal.
    ///
    /// Returns `true` only on the call that performs the transition.
    pub fn check_completion(&mut self) -> bool {
        if self.completed || !self.is_terminal() {
            return false;
        }
        self.completed = true;
        info!(
            mode = %self.mode.id,
            rule = %self.rule,
            remaining = self.deck.len(),
            "round completed"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ModeId, ModeRegistry};

    fn mode(id: ModeId) -> GameMode {
        ModeRegistry::standard().get(id).unwrap().clone()
    }

    fn binary_cards(count: u8) -> Vec<Card> {
        (0..count)
            .map(|bits| Card::from_traits((0..4).rev().map(|i| (bits >> i) & 1)))
            .collect()
    }

    #[test]
    fn test_deal_has_match_on_board() {
        let m = mode(ModeId::Normal);
        let round = RoundState::deal(&m, MatchRule::Normal, Deck::generate(&m, Some(42)));
        assert_eq!(round.board_size(), 12);
        assert_eq!(round.remaining(), 81);
        assert!(!round.matches().is_empty());
        assert!(!round.is_terminal());
    }

    #[test]
    fn test_deal_brings_matching_window_to_front() {
        let m = mode(ModeId::Normal);
        let mut cards = binary_cards(12);
        cards.push(Card::parse("2222").unwrap());
        let round = RoundState::deal(&m, MatchRule::Normal, Deck::from_cards(cards.clone()));

        let mut expected = cards[1..13].to_vec();
        expected.push(cards[0].clone());
        assert_eq!(round.deck(), expected);
        assert_eq!(round.board_size(), 12);
    }

    #[test]
    fn test_apply_match_refills_in_place() {
        let m = mode(ModeId::Normal);
        let mut round = RoundState::deal(&m, MatchRule::Normal, Deck::generate(&m, Some(42)));
        let before = round.deck();
        let hint = round.hint().unwrap();
        let positions: Vec<usize> = hint.iter().map(|c| round.board_position(c).unwrap()).collect();

        assert!(round.apply_match(&hint));
        assert_eq!(round.remaining(), 78);
        let board = round.board();
        for card in &hint {
            assert!(!board.contains(card));
        }
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        for (slot, &pos) in sorted.iter().enumerate() {
            assert_eq!(board[pos], before[12 + slot]);
        }
    }

    #[test]
    fn test_apply_match_refuses_bad_claims() {
        let m = mode(ModeId::Normal);
        let mut round = RoundState::deal(&m, MatchRule::Normal, Deck::generate(&m, Some(42)));
        let snapshot = round.clone();

        let hint = round.hint().unwrap();
        // Repeated card.
        assert!(!round.apply_match(&[hint[0].clone(), hint[0].clone(), hint[1].clone()]));
        // Card not visible.
        let hidden = round.deck()[20].clone();
        assert!(!round.apply_match(&[hint[0].clone(), hint[1].clone(), hidden]));
        // Wrong count.
        assert!(!round.apply_match(&hint[..2]));
        assert_eq!(round, snapshot);
    }

    #[test]
    fn test_board_grows_when_stuck() {
        let m = mode(ModeId::Normal);
        // 16 binary cards hold no set; the 2222 at the end only completes
        // complementary binary pairs.
        let mut cards = binary_cards(16);
        cards.push(Card::parse("2222").unwrap());
        let round = RoundState::new(&m, MatchRule::Normal, cards);
        assert_eq!(round.board_size(), 17);
        assert!(!round.is_terminal());
    }

    #[test]
    fn test_grown_board_compacts_after_match() {
        let m = mode(ModeId::Normal);
        let mut cards = binary_cards(16);
        cards.push(Card::parse("2222").unwrap());
        let mut round = RoundState::new(&m, MatchRule::Normal, cards);

        let claim = [
            Card::parse("0000").unwrap(),
            Card::parse("1111").unwrap(),
            Card::parse("2222").unwrap(),
        ];
        assert!(round.apply_match(&claim));
        assert_eq!(round.remaining(), 14);
        // Binary cards only: no match left, and the whole deck is visible.
        assert_eq!(round.board_size(), 14);
        assert!(round.is_terminal());
    }

    #[test]
    fn test_whole_board_match_advances_window() {
        let m = mode(ModeId::Junior);
        let cards: Vec<Card> = ["000", "111", "222", "012", "120", "201", "001", "002", "010", "020"]
            .iter()
            .map(|e| Card::parse(e).unwrap())
            .collect();
        let mut round = RoundState::new(&m, MatchRule::Normal, cards);
        assert_eq!(round.board_size(), 9);
        round.board_size = 3;

        let board = round.board();
        assert!(round.apply_match(&board));
        assert_eq!(round.remaining(), 7);
        assert_eq!(round.board()[0].encode(), "012");
    }

    #[test]
    fn test_completion_fires_once() {
        let m = mode(ModeId::Normal);
        let mut round = RoundState::new(&m, MatchRule::Normal, binary_cards(12));
        assert!(round.is_terminal());
        assert!(round.check_completion());
        assert!(!round.check_completion());
        assert!(round.is_completed());
        let board = round.board();
        assert!(!round.apply_match(&board[..3]));
    }

    #[test]
    fn test_empty_deck_is_terminal() {
        let m = mode(ModeId::Normal);
        let round = RoundState::new(&m, MatchRule::Normal, Vec::new());
        assert_eq!(round.board_size(), 0);
        assert!(round.is_terminal());
    }

    #[test]
    #[should_panic(expected = "does not support rule")]
    fn test_unsupported_rule_panics() {
        let m = mode(ModeId::Normal);
        let _ = RoundState::new(&m, MatchRule::Ultra, Vec::new());
    }

    #[test]
    #[should_panic(expected = "Invalid game mode")]
    fn test_zero_growth_step_panics() {
        let mut m = mode(ModeId::Normal);
        m.growth_step = 0;
        let cards = Deck::ordered(&m).into_cards();
        let _ = RoundState::new(&m, MatchRule::Normal, cards);
    }
}
