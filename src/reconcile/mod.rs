//! Event reconciliation: turning a concurrent claim log into one history.
//!
//! ## Key Types
//!
//! - `SubmittedEvent`: a claim as delivered by the event source
//! - `AcceptedMove`: a claim that made it into history
//! - `Reconciler`: memoized fold over the sorted log
//! - `Reconciliation`: accepted moves, final board and deck, per-player counts

pub mod event;
pub mod fold;

pub use event::{AcceptedMove, EventId, OrderKey, RoundMeta, RoundPhase, SubmittedEvent};
pub use fold::{replay, ReconcileError, Reconciler, Reconciliation, Rejection, RejectionCounts};
