//! Game records: the persisted, replay-reconstructible summary of a round.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::stats::{player_stats, winners, PlayerStats};
use crate::cards::Card;
use crate::core::{ModeId, PlayerId};
use crate::reconcile::{AcceptedMove, Reconciliation, RoundMeta};
use crate::rules::MatchRule;

/// Record building and encoding errors.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("round has not completed")]
    NotCompleted,
    #[error("cannot replace record {expected} with record {got}")]
    IdMismatch { expected: String, got: String },
    #[error("record codec: {0}")]
    Codec(#[from] bincode::Error),
}

/// A completed round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub created_at_ms: u64,
    pub finished_at_ms: u64,
    pub host: PlayerId,
    pub player_count: u32,
    /// Everyone who took part, including players with no matches.
    pub players: Vec<PlayerId>,
    pub mode: ModeId,
    pub rule: MatchRule,
    pub moves: Vec<AcceptedMove>,
    pub player_stats: BTreeMap<PlayerId, PlayerStats>,
    pub winners: Vec<PlayerId>,
    pub seed: Option<u64>,
    pub initial_deck: Option<Vec<Card>>,
    pub final_board: Option<Vec<Card>>,
}

impl GameRecord {
    /// Build the record for a completed reconciliation.
    ///
    /// The roster is sorted and deduplicated; the host is always on it.
    pub fn from_reconciliation(
        id: impl Into<String>,
        meta: &RoundMeta,
        result: &Reconciliation,
        roster: &[PlayerId],
        finished_at_ms: u64,
    ) -> Result<Self, HistoryError> {
        if !result.completed {
            return Err(HistoryError::NotCompleted);
        }

        let mut players = roster.to_vec();
        players.push(meta.host.clone());
        players.sort();
        players.dedup();

        Ok(Self {
            id: id.into(),
            created_at_ms: meta.started_at_ms,
            finished_at_ms,
            host: meta.host.clone(),
            player_count: players.len() as u32,
            player_stats: player_stats(&result.accepted, &players, meta.started_at_ms),
            winners: winners(&result.accepted),
            players,
            mode: meta.mode,
            rule: result.rule,
            moves: result.accepted.clone(),
            seed: Some(result.seed),
            initial_deck: Some(result.initial_deck.clone()),
            final_board: Some(result.board.clone()),
        })
    }

    /// Wall-clock length of the round.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.finished_at_ms.saturating_sub(self.created_at_ms)
    }

    /// Overwrite with a later version of the same record.
    ///
    /// Used when a multiplayer result is persisted late and must supersede
    /// the earlier one.
    pub fn replace(&mut self, newer: GameRecord) -> Result<(), HistoryError> {
        if newer.id != self.id {
            return Err(HistoryError::IdMismatch {
                expected: self.id.clone(),
                got: newer.id,
            });
        }
        *self = newer;
        Ok(())
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, HistoryError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from [`GameRecord::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HistoryError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
