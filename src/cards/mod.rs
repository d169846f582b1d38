//! Card system: the card value type and deck generation.
//!
//! ## Key Types
//!
//! - `Card`: Immutable trait vector with a digit-string encoding
//! - `Deck`: Every card of a mode, permuted by an optional seed

pub mod card;
pub mod deck;

pub use card::{Card, CardError, Traits};
pub use deck::Deck;
