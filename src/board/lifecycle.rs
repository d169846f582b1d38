//! Round lifecycle: status transitions and pause-aware elapsed time.
//!
//! ```text
//! NotStarted -> InProgress <-> Paused
//!                   |
//!                   v
//!               Completed
//! ```
//!
//! Pausing only freezes the clock; it never touches board or deck state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status of a round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    #[default]
    NotStarted,
    InProgress,
    Paused,
    Completed,
}

impl RoundStatus {
    /// Completed is the only terminal status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == RoundStatus::Completed
    }
}

/// Illegal lifecycle transition.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("cannot {action} a round that is {from:?}")]
pub struct LifecycleError {
    pub from: RoundStatus,
    pub action: &'static str,
}

/// Status plus elapsed-time accounting, in milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLifecycle {
    status: RoundStatus,
    /// Time accumulated over finished running stretches.
    banked_ms: u64,
    /// Start of the current running stretch.
    running_since_ms: Option<u64>,
}

impl RoundLifecycle {
    /// A round that has not started.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> RoundStatus {
        self.status
    }

    /// NotStarted -> InProgress.
    pub fn start(&mut self, now_ms: u64) -> Result<(), LifecycleError> {
        self.expect(RoundStatus::NotStarted, "start")?;
        self.status = RoundStatus::InProgress;
        self.running_since_ms = Some(now_ms);
        Ok(())
    }

    /// InProgress -> Paused.
    pub fn pause(&mut self, now_ms: u64) -> Result<(), LifecycleError> {
        self.expect(RoundStatus::InProgress, "pause")?;
        self.bank(now_ms);
        self.status = RoundStatus::Paused;
        Ok(())
    }

    /// Paused -> InProgress.
    pub fn resume(&mut self, now_ms: u64) -> Result<(), LifecycleError> {
        self.expect(RoundStatus::Paused, "resume")?;
        self.status = RoundStatus::InProgress;
        self.running_since_ms = Some(now_ms);
        Ok(())
    }

    /// InProgress or Paused -> Completed.
    ///
    /// Returns `Ok(false)` if the round was already completed, so callers can
    /// run completion side effects only on the `Ok(true)` transition.
    pub fn complete(&mut self, now_ms: u64) -> Result<bool, LifecycleError> {
        match self.status {
            RoundStatus::Completed => Ok(false),
            RoundStatus::NotStarted => Err(LifecycleError {
                from: self.status,
                action: "complete",
            }),
            RoundStatus::InProgress | RoundStatus::Paused => {
                self.bank(now_ms);
                self.status = RoundStatus::Completed;
                Ok(true)
            }
        }
    }

    /// Elapsed running time as of `now_ms`, excluding paused stretches.
    #[must_use]
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let running = self
            .running_since_ms
            .map_or(0, |since| now_ms.saturating_sub(since));
        self.banked_ms + running
    }

    fn bank(&mut self, now_ms: u64) {
        if let Some(since) = self.running_since_ms.take() {
            self.banked_ms += now_ms.saturating_sub(since);
        }
    }

    fn expect(&self, status: RoundStatus, action: &'static str) -> Result<(), LifecycleError> {
        if self.status == status {
            Ok(())
        } else {
            Err(LifecycleError {
                from: self.status,
                action,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut lc = RoundLifecycle::new();
        assert_eq!(lc.status(), RoundStatus::NotStarted);

        lc.start(1_000).unwrap();
        assert_eq!(lc.status(), RoundStatus::InProgress);
        assert_eq!(lc.elapsed_ms(1_500), 500);

        assert_eq!(lc.complete(3_000), Ok(true));
        assert!(lc.status().is_terminal());
        assert_eq!(lc.elapsed_ms(10_000), 2_000);
    }

    #[test]
    fn test_pause_freezes_clock() {
        let mut lc = RoundLifecycle::new();
        lc.start(0).unwrap();
        lc.pause(1_000).unwrap();
        assert_eq!(lc.elapsed_ms(5_000), 1_000);

        lc.resume(5_000).unwrap();
        assert_eq!(lc.elapsed_ms(6_000), 2_000);

        lc.pause(7_000).unwrap();
        assert_eq!(lc.complete(9_000), Ok(true));
        assert_eq!(lc.elapsed_ms(9_000), 3_000);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut lc = RoundLifecycle::new();
        lc.start(0).unwrap();
        assert_eq!(lc.complete(10), Ok(true));
        assert_eq!(lc.complete(20), Ok(false));
        assert_eq!(lc.elapsed_ms(100), 10);
    }

    #[test]
    fn test_illegal_transitions() {
        let mut lc = RoundLifecycle::new();
        assert_eq!(
            lc.pause(0),
            Err(LifecycleError {
                from: RoundStatus::NotStarted,
                action: "pause"
            })
        );
        assert!(lc.resume(0).is_err());
        assert!(lc.complete(0).is_err());

        lc.start(0).unwrap();
        assert!(lc.start(1).is_err());
        assert!(lc.resume(1).is_err());

        lc.complete(2).unwrap();
        assert!(lc.pause(3).is_err());
    }
}
