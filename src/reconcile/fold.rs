//! Deterministic reconciliation of a round's event log.
//!
//! Reconciliation is a left fold over the event log sorted by
//! `(timestamp, submitter, id)`, starting from the round's seeded deal. Each
//! event either changes the round (accepted) or leaves it untouched
//! (rejected). Rejection is ordinary contention, never an error: a claim
//! whose cards were already taken by an earlier event simply finds them gone.
//!
//! `Reconciler` memoizes the fold and only folds new suffix events. Anything
//! that would change the already-folded prefix (an event sorting before the
//! last folded one, or a duplicate id that sorts before the copy held)
//! triggers a full replay from the deal, so the output always equals `replay`
//! over the same log.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

use super::event::{AcceptedMove, EventId, OrderKey, RoundMeta, SubmittedEvent};
use crate::board::RoundState;
use crate::cards::{Card, Deck};
use crate::core::{GameMode, ModeError, ModeRegistry, PlayerId};
use crate::rules::{is_valid_set, ultra_decomposition, MatchRule};

/// Reconciliation setup errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("round has no seed; its deck cannot be rebuilt")]
    MissingSeed,
    #[error("mode {mode} does not support rule {rule}")]
    UnsupportedRule { mode: String, rule: MatchRule },
    #[error(transparent)]
    Mode(#[from] ModeError),
}

/// Why an event was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Undecodable card, wrong card count, or a repeated card.
    Malformed,
    /// At least one card is not on the board (already taken or never dealt).
    Stale,
    /// Cards are on the board but do not form a match.
    Invalid,
    /// The round had already completed.
    AfterCompletion,
}

/// Rejection counters, for diagnostics only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    pub malformed: u32,
    pub stale: u32,
    pub invalid: u32,
    pub after_completion: u32,
}

impl RejectionCounts {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Malformed => self.malformed += 1,
            Rejection::Stale => self.stale += 1,
            Rejection::Invalid => self.invalid += 1,
            Rejection::AfterCompletion => self.after_completion += 1,
        }
    }

    /// Total rejected events.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.malformed + self.stale + self.invalid + self.after_completion
    }
}

/// Outcome of folding an event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub seed: u64,
    pub rule: MatchRule,
    /// Deck as dealt, before any event.
    pub initial_deck: Vec<Card>,
    /// Accepted moves in fold order.
    pub accepted: Vec<AcceptedMove>,
    pub board: Vec<Card>,
    /// Every card still in play, board first.
    pub deck: Vec<Card>,
    /// Accepted-move count per submitter.
    pub counts: BTreeMap<PlayerId, u32>,
    pub completed: bool,
    /// Timestamp of the event that completed the round.
    pub completed_at_ms: Option<u64>,
    pub rejections: RejectionCounts,
}

impl Reconciliation {
    /// Board encodings for display.
    #[must_use]
    pub fn board_encodings(&self) -> Vec<String> {
        self.board.iter().map(Card::encode).collect()
    }
}

/// Incremental, memoized fold over a growing event log.
#[derive(Clone, Debug)]
pub struct Reconciler {
    seed: u64,
    initial: RoundState,
    state: RoundState,
    log: BTreeMap<OrderKey, SubmittedEvent>,
    ids: FxHashMap<EventId, OrderKey>,
    folded_through: Option<OrderKey>,
    accepted: Vec<AcceptedMove>,
    rejections: RejectionCounts,
    completed_at_ms: Option<u64>,
    abandoned: bool,
}

impl Reconciler {
    /// Rebuild a round from its mode, rule and seed.
    pub fn new(mode: &GameMode, rule: MatchRule, seed: u64) -> Result<Self, ReconcileError> {
        mode.validate()?;
        if !mode.supports(rule) {
            return Err(ReconcileError::UnsupportedRule {
                mode: mode.id.to_string(),
                rule,
            });
        }
        let mut initial = RoundState::deal(mode, rule, Deck::generate(mode, Some(seed)));
        initial.check_completion();

        Ok(Self {
            seed,
            state: initial.clone(),
            initial,
            log: BTreeMap::new(),
            ids: FxHashMap::default(),
            folded_through: None,
            accepted: Vec::new(),
            rejections: RejectionCounts::default(),
            completed_at_ms: None,
            abandoned: false,
        })
    }

    /// Rebuild a round from its metadata, using the mode's default rule.
    pub fn from_meta(meta: &RoundMeta, registry: &ModeRegistry) -> Result<Self, ReconcileError> {
        let seed = meta.seed.ok_or(ReconcileError::MissingSeed)?;
        let mode = registry
            .get(meta.mode)
            .ok_or_else(|| ModeError::UnknownMode(meta.mode.to_string()))?;
        Self::new(mode, mode.default_rule, seed)
    }

    /// Add events to the log and fold whatever is new.
    ///
    /// Duplicates (same id) are no-ops unless they sort earlier than the copy
    /// already held, in which case the earlier copy wins. Copies with equal
    /// keys are ordered by their card encodings. Events reaching an abandoned
    /// round are ignored.
    pub fn ingest(&mut self, events: impl IntoIterator<Item = SubmittedEvent>) {
        if self.abandoned {
            return;
        }

        let mut rewind = false;
        for event in events {
            let key = event.order_key();
            if let Some(existing) = self.ids.get(&event.id).cloned() {
                let keep_held = self.log.get(&existing).is_some_and(|held| {
                    (&existing, &held.card_encodings) <= (&key, &event.card_encodings)
                });
                if keep_held {
                    trace!(event = %event.id, "duplicate event ignored");
                    continue;
                }
                self.log.remove(&existing);
                rewind |= self.folded_through.as_ref().is_some_and(|f| existing <= *f);
            }
            rewind |= self.folded_through.as_ref().is_some_and(|f| key < *f);
            self.ids.insert(event.id.clone(), key.clone());
            self.log.insert(key, event);
        }

        if rewind {
            debug!(events = self.log.len(), "log changed behind the fold; replaying from deal");
            self.reset();
        }
        self.fold_pending();
    }

    /// Stop folding. The state reached so far is kept.
    pub fn abandon(&mut self) {
        debug!(accepted = self.accepted.len(), "round abandoned");
        self.abandoned = true;
    }

    /// Whether the round was abandoned.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// Current round state.
    #[must_use]
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Accepted moves so far.
    #[must_use]
    pub fn accepted(&self) -> &[AcceptedMove] {
        &self.accepted
    }

    /// Whether the round has completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state.is_completed()
    }

    /// Snapshot of the fold's output.
    #[must_use]
    pub fn result(&self) -> Reconciliation {
        let mut counts = BTreeMap::new();
        for mv in &self.accepted {
            *counts.entry(mv.submitter.clone()).or_insert(0) += 1;
        }
        Reconciliation {
            seed: self.seed,
            rule: self.state.rule(),
            initial_deck: self.initial.deck(),
            accepted: self.accepted.clone(),
            board: self.state.board(),
            deck: self.state.deck(),
            counts,
            completed: self.state.is_completed(),
            completed_at_ms: self.completed_at_ms,
            rejections: self.rejections.clone(),
        }
    }

    fn reset(&mut self) {
        self.state = self.initial.clone();
        self.folded_through = None;
        self.accepted.clear();
        self.rejections = RejectionCounts::default();
        self.completed_at_ms = None;
    }

    fn fold_pending(&mut self) {
        let pending: Vec<SubmittedEvent> = match &self.folded_through {
            Some(last) => self
                .log
                .range((std::ops::Bound::Excluded(last), std::ops::Bound::Unbounded))
                .map(|(_, e)| e.clone())
                .collect(),
            None => self.log.values().cloned().collect(),
        };
        for event in pending {
            self.step(&event);
            self.folded_through = Some(event.order_key());
        }
    }

    fn step(&mut self, event: &SubmittedEvent) {
        match self.try_accept(event) {
            Ok(mv) => {
                debug!(
                    event = %mv.event_id,
                    submitter = %mv.submitter,
                    board_size = mv.board_size,
                    "accepted"
                );
                self.accepted.push(mv);
                if self.state.check_completion() {
                    self.completed_at_ms = Some(event.timestamp_ms);
                    info!(
                        moves = self.accepted.len(),
                        at_ms = event.timestamp_ms,
                        "reconciled round reached completion"
                    );
                }
            }
            Err(rejection) => {
                debug!(
                    event = %event.id,
                    submitter = %event.submitter,
                    ?rejection,
                    "rejected"
                );
                self.rejections.record(rejection);
            }
        }
    }

    fn try_accept(&mut self, event: &SubmittedEvent) -> Result<AcceptedMove, Rejection> {
        if self.state.is_completed() {
            return Err(Rejection::AfterCompletion);
        }

        let mode = self.state.mode();
        let rule = self.state.rule();
        let cards = event
            .card_encodings
            .iter()
            .map(|encoding| Card::decode(encoding, mode))
            .collect::<Result<Vec<Card>, _>>()
            .map_err(|_| Rejection::Malformed)?;
        if !rule.accepts_count(cards.len())
            || cards.iter().enumerate().any(|(i, c)| cards[..i].contains(c))
        {
            return Err(Rejection::Malformed);
        }
        if cards.iter().any(|c| self.state.board_position(c).is_none()) {
            return Err(Rejection::Stale);
        }
        if !is_valid_set(&cards, rule, mode) {
            return Err(Rejection::Invalid);
        }

        let decomposition = match rule {
            MatchRule::Ultra => ultra_decomposition(&cards, mode),
            _ => None,
        };
        if !self.state.apply_match(&cards) {
            return Err(Rejection::Invalid);
        }

        Ok(AcceptedMove {
            event_id: event.id.clone(),
            submitter: event.submitter.clone(),
            timestamp_ms: event.timestamp_ms,
            cards,
            board_size: self.state.board_size(),
            decomposition,
        })
    }
}

/// Fold a complete event log from scratch.
pub fn replay(
    mode: &GameMode,
    rule: MatchRule,
    seed: u64,
    events: impl IntoIterator<Item = SubmittedEvent>,
) -> Result<Reconciliation, ReconcileError> {
    let mut reconciler = Reconciler::new(mode, rule, seed)?;
    reconciler.ingest(events);
    Ok(reconciler.result())
}
