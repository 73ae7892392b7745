//! Link status evaluation for vaultlink.
//!
//! Classifies the relationship between a vault source file and an external
//! target path into a fixed set of states. Evaluation is a pure function of
//! the filesystem; nothing is cached or persisted.
//!
//! The ordering of checks is significant: a missing source masks every
//! target-side condition, because no reconciliation is possible regardless of
//! what sits at the target.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Classification of a (source, target) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkState {
    /// Target is a symlink resolving to the source.
    Ok,
    /// Target does not exist.
    Missing,
    /// Target is a symlink pointing somewhere else.
    Mismatch,
    /// Source does not exist; masks all target-side states.
    SourceMissing,
    /// Target exists but is a regular file or directory, not a symlink.
    FileNotLink,
    /// An unexpected I/O failure occurred during evaluation.
    Error,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkState::Ok => "ok",
            LinkState::Missing => "missing",
            LinkState::Mismatch => "mismatch",
            LinkState::SourceMissing => "source-missing",
            LinkState::FileNotLink => "file-not-link",
            LinkState::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// A link state plus a human-readable reason.
///
/// Transient: recomputed on every query, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    pub state: LinkState,
    pub reason: String,
}

impl LinkStatus {
    fn new(state: LinkState, reason: impl Into<String>) -> Self {
        Self {
            state,
            reason: reason.into(),
        }
    }
}

/// Evaluate the relationship between an absolute source and target path.
///
/// Both paths must already be resolved; see the `paths` module.
pub fn evaluate(source_abs: &Path, target_abs: &Path) -> LinkStatus {
    if !source_abs.exists() {
        return LinkStatus::new(LinkState::SourceMissing, "source missing");
    }

    // symlink_metadata looks at the entry itself, so a dangling symlink at
    // the target still counts as present (and classifies as mismatch below).
    let target_meta = match target_abs.symlink_metadata() {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return LinkStatus::new(LinkState::Missing, "not linked");
        }
        Err(e) => {
            return LinkStatus::new(LinkState::Error, format!("error: {}", e));
        }
    };

    if !target_meta.file_type().is_symlink() {
        return LinkStatus::new(LinkState::FileNotLink, "file exists (not a symlink)");
    }

    let link_dest = match std::fs::read_link(target_abs) {
        Ok(dest) => dest,
        Err(e) => return LinkStatus::new(LinkState::Error, format!("error: {}", e)),
    };

    // A relative link is interpreted relative to its own containing directory.
    let link_dest_abs = if link_dest.is_absolute() {
        link_dest
    } else {
        target_abs
            .parent()
            .map(|parent| parent.join(&link_dest))
            .unwrap_or(link_dest)
    };

    if normalize(&link_dest_abs) == normalize(source_abs) {
        LinkStatus::new(LinkState::Ok, "ok")
    } else {
        LinkStatus::new(
            LinkState::Mismatch,
            format!("points elsewhere: {}", link_dest_abs.display()),
        )
    }
}

/// Canonicalize for comparison when possible, so links through symlinked
/// directories still compare equal. Dangling destinations fall back to the
/// raw path.
fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
