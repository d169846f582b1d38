//! Core engine types: players, deterministic RNG, game-mode configuration.
//!
//! This module contains the building blocks shared by every rule. Modes are
//! configured via `GameMode` rather than hardcoded in the matching logic.

pub mod player;
pub mod rng;
pub mod config;

pub use player::PlayerId;
pub use rng::{DeckRng, DeckRngState};
pub use config::{GameMode, ModeError, ModeId, ModeRegistry, DEFAULT_GROWTH_STEP, MAX_VARIANTS};
