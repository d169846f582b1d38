//! Board maintenance and round lifecycle.
//!
//! - `RoundState`: working deck, visible board, match application, resizing,
//!   terminal detection
//! - `RoundLifecycle`: status state machine with a pause-aware clock

pub mod lifecycle;
pub mod round;

pub use lifecycle::{LifecycleError, RoundLifecycle, RoundStatus};
pub use round::RoundState;
