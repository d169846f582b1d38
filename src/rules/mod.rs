//! Match rules and the matching engine.
//!
//! - `MatchRule`: closed set of rules, one arity list and predicate each
//! - `Combinations`: lexicographic index tuples for board enumeration
//! - `engine`: conjugates, validity checks, match search, board finding

pub mod rule;
pub mod combinations;
pub mod engine;

pub use rule::MatchRule;
pub use combinations::{binomial, Combinations, IndexCombo};
pub use engine::{
    conjugate, conjugate4, find_all_matches, find_board, find_board_offset, first_match,
    has_match, is_valid_set, ultra_decomposition, UltraDecomposition,
};
