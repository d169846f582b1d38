//! Event-log types: submitted claims, accepted moves, round metadata.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::core::{ModeId, PlayerId};
use crate::rules::UltraDecomposition;

/// Identifier of a submitted event, unique within a round's log.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create a new event ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Total order used to fold events: timestamp, then submitter, then id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderKey {
    pub timestamp_ms: u64,
    pub submitter: PlayerId,
    pub id: EventId,
}

/// A claimed match as it arrives from the event source.
///
/// Cards are referenced by encoding, never by board index: indices mean
/// nothing across replicas.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedEvent {
    pub id: EventId,
    pub submitter: PlayerId,
    pub timestamp_ms: u64,
    pub card_encodings: Vec<String>,
}

impl SubmittedEvent {
    /// Create a new event.
    pub fn new<S: Into<String>>(
        id: impl Into<String>,
        submitter: impl Into<String>,
        timestamp_ms: u64,
        cards: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            id: EventId::new(id),
            submitter: PlayerId::new(submitter),
            timestamp_ms,
            card_encodings: cards.into_iter().map(Into::into).collect(),
        }
    }

    /// The key this event is folded by.
    #[must_use]
    pub fn order_key(&self) -> OrderKey {
        OrderKey {
            timestamp_ms: self.timestamp_ms,
            submitter: self.submitter.clone(),
            id: self.id.clone(),
        }
    }
}

/// A claim the reconciler accepted into the round's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedMove {
    pub event_id: EventId,
    pub submitter: PlayerId,
    pub timestamp_ms: u64,
    /// The matched cards, in claim order.
    pub cards: Vec<Card>,
    /// Board size after the match was applied and the board resized.
    pub board_size: usize,
    /// How a four-card ULTRA match splits into pairs.
    pub decomposition: Option<UltraDecomposition>,
}

impl AcceptedMove {
    /// Card encodings for display.
    #[must_use]
    pub fn encodings(&self) -> Vec<String> {
        self.cards.iter().map(Card::encode).collect()
    }
}

/// Round status as reported by the round metadata source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundPhase {
    Waiting,
    Ingame,
    Completed,
}

/// Round metadata needed to rebuild and replay a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundMeta {
    pub mode: ModeId,
    pub seed: Option<u64>,
    pub status: RoundPhase,
    pub host: PlayerId,
    pub started_at_ms: u64,
}
