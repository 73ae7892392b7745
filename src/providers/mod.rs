//! Reconciliation providers for vaultlink.
//!
//! Each provider knows how to reconcile one (source, target) pair under a
//! given mode, and reports what it did as a tagged [`Outcome`] instead of
//! relying on console side effects. Providers honor dry-run by performing
//! every read and decision step identically to a live run while suppressing
//! all filesystem mutation.

pub mod copy;
pub mod external;
pub mod link;

pub use external::{SystemToolFactory, ToolFactory, ToolRunner};

/// Per-pair reconciliation result.
///
/// Collected by the engine into run-level stats; `Failed` never aborts the
/// run, it is recorded and iteration continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A link was created at the target.
    ///
    /// `fallback_copy` is set when symlink creation was refused by the
    /// platform (permission or cross-device) and a plain file copy was made
    /// instead.
    Created { fallback_copy: bool },

    /// One or more file copies were performed (`files` counts legs that ran).
    Copied { files: u32 },

    /// Nothing to do for this pair.
    Skipped { reason: String },

    /// This pair could not be reconciled; the run continues.
    Failed { reason: String },
}

impl Outcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Outcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Outcome::Failed {
            reason: reason.into(),
        }
    }
}
