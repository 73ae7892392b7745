//! Timestamp copy provider: reconciles a mapping by copying whichever side
//! was modified most recently.
//!
//! Both mtimes are snapshotted once before either leg runs. Under
//! `bidirectional` both legs may fire in the same invocation; comparing
//! against the snapshot (not a re-stat) keeps a leg from clobbering the
//! other based on a timestamp it just created itself.

use super::Outcome;
use crate::config::Direction;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Reconcile one (source, target) pair by mtime comparison.
///
/// Both paths must be absolute. Copies only when the acting side's mtime is
/// strictly greater than the other side's; equal mtimes never copy. With
/// `dry_run` set, every stat and comparison runs but no copy is performed.
pub fn reconcile(
    source_abs: &Path,
    target_abs: &Path,
    direction: Direction,
    dry_run: bool,
) -> Outcome {
    // Snapshot both sides up front.
    let source_mtime = match mtime(source_abs) {
        Ok(Some(t)) => t,
        Ok(None) => {
            return Outcome::failed(format!("source missing: {}", source_abs.display()));
        }
        Err(e) => return Outcome::failed(format!("failed to stat source: {}", e)),
    };
    let target_mtime = match mtime(target_abs) {
        Ok(t) => t,
        Err(e) => return Outcome::failed(format!("failed to stat target: {}", e)),
    };

    let mut files = 0u32;

    if direction.includes_forward() {
        match target_mtime {
            None => {
                // New target: copy and create parent directories as needed.
                if let Err(e) = copy_into(source_abs, target_abs, dry_run, true) {
                    return Outcome::failed(format!(
                        "failed to copy to '{}': {}",
                        target_abs.display(),
                        e
                    ));
                }
                println!("  -> {} (new)", target_abs.display());
                files += 1;
            }
            Some(t) if source_mtime > t => {
                if let Err(e) = copy_into(source_abs, target_abs, dry_run, false) {
                    return Outcome::failed(format!(
                        "failed to copy to '{}': {}",
                        target_abs.display(),
                        e
                    ));
                }
                println!("  -> {} (newer)", target_abs.display());
                files += 1;
            }
            Some(_) => {}
        }
    }

    if direction.includes_reverse()
        && let Some(t) = target_mtime
        && t > source_mtime
    {
        if let Err(e) = copy_into(target_abs, source_abs, dry_run, false) {
            return Outcome::failed(format!(
                "failed to copy back to '{}': {}",
                source_abs.display(),
                e
            ));
        }
        println!("  <- {} (newer from target)", source_abs.display());
        files += 1;
    }

    if files > 0 {
        Outcome::Copied { files }
    } else {
        Outcome::skipped("up to date")
    }
}

/// Modification time of a path, `None` when it does not exist.
fn mtime(path: &Path) -> io::Result<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(meta) => meta.modified().map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn copy_into(from: &Path, to: &Path, dry_run: bool, create_parents: bool) -> io::Result<()> {
    if dry_run {
        return Ok(());
    }
    if create_parents
        && let Some(parent) = to.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}
