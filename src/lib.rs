//! # set-engine
//!
//! Rules engine and state reconciliation for multi-trait card-matching games
//! (generalized "Set").
//!
//! ## Design Principles
//!
//! 1. **Mode-Driven**: Trait counts, variants, board sizes and rules come from
//!    `GameMode`. Nothing assumes four traits or three variants.
//!
//! 2. **Pure Rules**: Matching is a set of pure functions over cards. Match
//!    enumeration order is fixed (lexicographic by board index).
//!
//! 3. **Explicit State**: A round is a `RoundState` value owned by whoever
//!    drives it. There is no global "current game".
//!
//! ## Architecture
//!
//! - **Seeded Decks**: ChaCha8-based permutation, identical on every platform,
//!   so any client can rebuild a round from its seed.
//!
//! - **Reconciliation as a Fold**: Claims are folded in
//!   `(timestamp, submitter, id)` order. Conflicts resolve by that order,
//!   never by arrival time.
//!
//! - **Persistent Data Structures**: O(1) round snapshots via `im-rs`.
//!
//! ## Modules
//!
//! - `core`: Player ids, deterministic RNG, game modes
//! - `cards`: Card value type and deck generation
//! - `rules`: Match rules and the matching engine
//! - `board`: Board maintenance and round lifecycle
//! - `reconcile`: Event-log reconciliation
//! - `history`: Game records, winners, statistics, record sink

pub mod core;
pub mod cards;
pub mod rules;
pub mod board;
pub mod reconcile;
pub mod history;

// Re-export commonly used types
pub use crate::core::{DeckRng, GameMode, ModeError, ModeId, ModeRegistry, PlayerId};

pub use crate::cards::{Card, CardError, Deck};

pub use crate::rules::{
    conjugate, conjugate4, find_all_matches, find_board, first_match, has_match, is_valid_set,
    ultra_decomposition, Combinations, IndexCombo, MatchRule, UltraDecomposition,
};

pub use crate::board::{LifecycleError, RoundLifecycle, RoundState, RoundStatus};

pub use crate::reconcile::{
    replay, AcceptedMove, EventId, ReconcileError, Reconciler, Reconciliation, RoundMeta,
    RoundPhase, SubmittedEvent,
};

pub use crate::history::{
    winners, AggregateStats, GameRecord, HistoryError, MemorySink, PlayerCategory, PlayerStats,
    RecordFilter, RecordSink, SinkError,
};
