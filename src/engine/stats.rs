//! Run-level counters for sync and removal passes.

use crate::providers::Outcome;
use serde::Serialize;

/// Counts of per-pair outcomes across one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub created: u32,
    pub copied: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl SyncStats {
    /// Record one pair's outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Created { .. } => self.created += 1,
            Outcome::Copied { .. } => self.copied += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Total number of pairs visited.
    pub fn total(&self) -> u32 {
        self.created + self.copied + self.skipped + self.failed
    }
}

/// Counts for one removal pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemoveStats {
    /// Target entries deleted (or that would be, under dry-run).
    pub removed: u32,
    /// Targets that did not exist in the first place.
    pub missing: u32,
    pub failed: u32,
}
