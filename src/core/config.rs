//! Game mode configuration.
//!
//! A `GameMode` fixes everything the rule engine needs to know about a round:
//! - Trait count and the number of variants per trait
//! - Deck size (always the product of the variant counts)
//! - Minimum board size and how far the board grows when it is stuck
//! - The match rules the mode supports, and which one it plays by default
//!
//! `ModeRegistry` is the static catalog of known modes.

use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::rules::MatchRule;

/// Largest variant count a trait may have (cards encode as decimal digits).
pub const MAX_VARIANTS: u8 = 10;

/// Default number of cards added when the board has no match.
pub const DEFAULT_GROWTH_STEP: usize = 3;

/// Configuration errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModeError {
    #[error("unknown game mode: {0:?}")]
    UnknownMode(String),
    #[error("mode must have at least one trait")]
    NoTraits,
    #[error("trait {index} has {variants} variants (allowed 2..={max})")]
    VariantsOutOfRange { index: usize, variants: u8, max: u8 },
    #[error("deck size {deck_size} does not match product of variants {expected}")]
    DeckSizeMismatch { deck_size: usize, expected: usize },
    #[error("board size {board_size} outside {min}..={max}")]
    BoardSizeOutOfRange { board_size: usize, min: usize, max: usize },
    #[error("rule {rule} requires {requirement}")]
    RuleIncompatible { rule: MatchRule, requirement: &'static str },
    #[error("mode must support at least one rule, including its default")]
    NoRules,
    #[error("growth step must be at least 1")]
    ZeroGrowthStep,
}

/// Identifier for a game mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeId {
    Normal,
    Junior,
    Ultra,
    Ghost,
    Xor,
    Mega,
}

impl ModeId {
    /// All known mode ids, in catalog order.
    pub const ALL: [ModeId; 6] = [
        ModeId::Normal,
        ModeId::Junior,
        ModeId::Ultra,
        ModeId::Ghost,
        ModeId::Xor,
        ModeId::Mega,
    ];

    /// Stable string id.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ModeId::Normal => "normal",
            ModeId::Junior => "junior",
            ModeId::Ultra => "ultra",
            ModeId::Ghost => "ghost",
            ModeId::Xor => "xor",
            ModeId::Mega => "mega",
        }
    }
}

impl std::fmt::Display for ModeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeId {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModeId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ModeError::UnknownMode(s.to_string()))
    }
}

/// Complete rule configuration for one game mode.
///
/// ## Example
///
/// ```
/// use set_engine::core::{GameMode, ModeId};
/// use set_engine::rules::MatchRule;
///
/// let mode = GameMode::new(ModeId::Junior, &[3, 3, 3], 9, MatchRule::Normal);
/// assert_eq!(mode.deck_size, 27);
/// assert_eq!(mode.trait_count(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameMode")]
pub struct GameMode {
    /// Mode identifier.
    pub id: ModeId,

    /// Variant count for each trait position.
    pub trait_variants: SmallVec<[u8; 6]>,

    /// Number of cards in a full deck.
    pub deck_size: usize,

    /// Minimum number of visible cards.
    pub board_size: usize,

    /// Cards added per growth step when the board has no match.
    pub growth_step: usize,

    /// Rule used when a round does not ask for a specific one.
    pub default_rule: MatchRule,

    /// Every rule this mode can be played with.
    pub rules: SmallVec<[MatchRule; 2]>,
}

impl GameMode {
    /// Create a new game mode.
    ///
    /// Panics if the configuration violates any mode invariant.
    pub fn new(id: ModeId, trait_variants: &[u8], board_size: usize, rule: MatchRule) -> Self {
        let deck_size = trait_variants.iter().map(|&v| v as usize).product();
        let mode = Self {
            id,
            trait_variants: SmallVec::from_slice(trait_variants),
            deck_size,
            board_size,
            growth_step: DEFAULT_GROWTH_STEP,
            default_rule: rule,
            rules: SmallVec::from_slice(&[rule]),
        };
        mode.assert_valid();
        mode
    }

    /// Add another supported rule.
    #[must_use]
    pub fn with_rule(mut self, rule: MatchRule) -> Self {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
        self.assert_valid();
        self
    }

    /// Set the board growth step.
    #[must_use]
    pub fn with_growth_step(mut self, step: usize) -> Self {
        self.growth_step = step;
        self.assert_valid();
        self
    }

    /// Number of traits per card.
    #[must_use]
    pub fn trait_count(&self) -> usize {
        self.trait_variants.len()
    }

    /// Variant count of trait `index`.
    #[must_use]
    pub fn variants(&self, index: usize) -> u8 {
        self.trait_variants[index]
    }

    /// True when every trait has exactly three variants.
    #[must_use]
    pub fn is_ternary(&self) -> bool {
        self.trait_variants.iter().all(|&v| v == 3)
    }

    /// Check whether the mode supports a rule.
    #[must_use]
    pub fn supports(&self, rule: MatchRule) -> bool {
        self.rules.contains(&rule)
    }

    /// Check all mode invariants.
    pub fn validate(&self) -> Result<(), ModeError> {
        if self.trait_variants.is_empty() {
            return Err(ModeError::NoTraits);
        }
        for (index, &variants) in self.trait_variants.iter().enumerate() {
            if !(2..=MAX_VARIANTS).contains(&variants) {
                return Err(ModeError::VariantsOutOfRange {
                    index,
                    variants,
                    max: MAX_VARIANTS,
                });
            }
        }

        let expected: usize = self.trait_variants.iter().map(|&v| v as usize).product();
        if self.deck_size != expected {
            return Err(ModeError::DeckSizeMismatch {
                deck_size: self.deck_size,
                expected,
            });
        }

        if self.rules.is_empty() || !self.rules.contains(&self.default_rule) {
            return Err(ModeError::NoRules);
        }
        if self.growth_step == 0 {
            return Err(ModeError::ZeroGrowthStep);
        }

        let min_board = self
            .rules
            .iter()
            .map(|r| r.enumeration_arity())
            .max()
            .unwrap_or(1);
        if self.board_size < min_board || self.board_size > self.deck_size {
            return Err(ModeError::BoardSizeOutOfRange {
                board_size: self.board_size,
                min: min_board,
                max: self.deck_size,
            });
        }

        for &rule in &self.rules {
            match rule {
                MatchRule::Normal | MatchRule::Ultra | MatchRule::Ghost => {
                    if !self.is_ternary() {
                        return Err(ModeError::RuleIncompatible {
                            rule,
                            requirement: "exactly 3 variants per trait",
                        });
                    }
                }
                MatchRule::XorSet => {
                    if !self.trait_variants.iter().all(|v| v.is_power_of_two()) {
                        return Err(ModeError::RuleIncompatible {
                            rule,
                            requirement: "a power-of-two variant count per trait",
                        });
                    }
                }
            }
        }

        Ok(())
    }

    pub(crate) fn assert_valid(&self) {
        if let Err(e) = self.validate() {
            panic!("Invalid game mode {}: {}", self.id, e);
        }
    }
}

/// Unchecked wire form of [`GameMode`]; deserializing validates it.
#[derive(Deserialize)]
struct RawGameMode {
    id: ModeId,
    trait_variants: SmallVec<[u8; 6]>,
    deck_size: usize,
    board_size: usize,
    growth_step: usize,
    default_rule: MatchRule,
    rules: SmallVec<[MatchRule; 2]>,
}

impl TryFrom<RawGameMode> for GameMode {
    type Error = ModeError;

    fn try_from(raw: RawGameMode) -> Result<Self, Self::Error> {
        let mode = Self {
            id: raw.id,
            trait_variants: raw.trait_variants,
            deck_size: raw.deck_size,
            board_size: raw.board_size,
            growth_step: raw.growth_step,
            default_rule: raw.default_rule,
            rules: raw.rules,
        };
        mode.validate()?;
        Ok(mode)
    }
}

/// Catalog of game modes keyed by id.
#[derive(Clone, Debug, Default)]
pub struct ModeRegistry {
    modes: FxHashMap<ModeId, GameMode>,
}

impl ModeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(GameMode::new(ModeId::Normal, &[3, 3, 3, 3], 12, MatchRule::Normal));
        registry.register(GameMode::new(ModeId::Junior, &[3, 3, 3], 9, MatchRule::Normal));
        registry.register(GameMode::new(ModeId::Ultra, &[3, 3, 3, 3], 12, MatchRule::Ultra));
        registry.register(
            GameMode::new(ModeId::Ghost, &[3, 3, 3, 3], 10, MatchRule::Ghost)
                .with_rule(MatchRule::Normal),
        );
        registry.register(GameMode::new(ModeId::Xor, &[4, 4, 4], 12, MatchRule::XorSet));
        registry.register(GameMode::new(ModeId::Mega, &[3, 3, 3, 3, 3], 15, MatchRule::Normal));
        registry
    }

    /// Register a mode.
    ///
    /// Panics if a mode with the same id is already registered.
    pub fn register(&mut self, mode: GameMode) {
        if self.modes.contains_key(&mode.id) {
            panic!("Mode {} already registered", mode.id);
        }
        self.modes.insert(mode.id, mode);
    }

    /// Look up a mode by id.
    #[must_use]
    pub fn get(&self, id: ModeId) -> Option<&GameMode> {
        self.modes.get(&id)
    }

    /// Look up a mode by its string id.
    pub fn get_by_name(&self, name: &str) -> Result<&GameMode, ModeError> {
        let id: ModeId = name.parse()?;
        self.get(id).ok_or_else(|| ModeError::UnknownMode(name.to_string()))
    }

    /// Number of registered modes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Iterate over all modes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &GameMode> {
        let mut modes: Vec<_> = self.modes.values().collect();
        modes.sort_by_key(|m| m.id);
        modes.into_iter()
    }
}
