//! Match rule identifiers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::ModeError;

/// The matching rules a round can be played with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Three cards whose traits sum to 0 mod 3 in every position.
    Normal,
    /// Four cards splitting into two pairs with the same conjugate.
    Ultra,
    /// Four cards whose traits XOR to 0 in every position.
    XorSet,
    /// A normal set, or two cards completed by an implicit ghost card.
    Ghost,
}

impl MatchRule {
    /// Card counts a claim may have under this rule.
    #[must_use]
    pub const fn arities(self) -> &'static [usize] {
        match self {
            MatchRule::Normal => &[3],
            MatchRule::Ultra | MatchRule::XorSet => &[4],
            MatchRule::Ghost => &[2, 3],
        }
    }

    /// Combination size used when enumerating matches on a board.
    ///
    /// The two-card ghost branch is never enumerated.
    #[must_use]
    pub const fn enumeration_arity(self) -> usize {
        match self {
            MatchRule::Normal | MatchRule::Ghost => 3,
            MatchRule::Ultra | MatchRule::XorSet => 4,
        }
    }

    /// Check whether a claim of `count` cards has an acceptable size.
    #[must_use]
    pub fn accepts_count(self, count: usize) -> bool {
        self.arities().contains(&count)
    }

    /// Stable string id.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MatchRule::Normal => "normal",
            MatchRule::Ultra => "ultra",
            MatchRule::XorSet => "xor_set",
            MatchRule::Ghost => "ghost",
        }
    }
}

impl std::fmt::Display for MatchRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchRule {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            MatchRule::Normal,
            MatchRule::Ultra,
            MatchRule::XorSet,
            MatchRule::Ghost,
        ]
        .into_iter()
        .find(|r| r.as_str() == s)
        .ok_or_else(|| ModeError::UnknownMode(s.to_string()))
    }
}
