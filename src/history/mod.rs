//! History and statistics.
//!
//! - `GameRecord`: persisted summary of a completed round
//! - `winners`, `player_stats`: per-round projections of accepted moves
//! - `AggregateStats`: one player's numbers across many records
//! - `RecordSink`: the persistence boundary

pub mod record;
pub mod sink;
pub mod stats;

pub use record::{GameRecord, HistoryError};
pub use sink::{MemorySink, RecordSink, SinkError};
pub use stats::{player_stats, winners, AggregateStats, PlayerCategory, PlayerStats, RecordFilter};
