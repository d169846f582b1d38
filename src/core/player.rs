//! Player identification.
//!
//! ## PlayerId
//!
//! Opaque submitter identifier handed to us by the event source. Ordering is
//! lexical on the raw id, which is what reconciliation uses as its secondary
//! sort key after the timestamp.

use serde::{Deserialize, Serialize};

/// Opaque player (submitter) identifier.
///
/// ```
/// use set_engine::core::PlayerId;
///
/// let a = PlayerId::new("alice");
/// let b = PlayerId::new("bob");
/// assert!(a < b);
/// assert_eq!(a.as_str(), "alice");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a new player ID.
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

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
