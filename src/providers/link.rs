//! Direct link provider: reconciles a mapping by symlinking the target to
//! the vault source.
//!
//! A pre-existing regular file at the target is deliberately left untouched
//! rather than overwritten; only missing targets and wrong symlinks are
//! reconciled. Platforms that refuse symlink creation (permissions,
//! cross-device links) get a plain file copy instead, which is an expected
//! and recoverable condition rather than a failure.

use super::Outcome;
use crate::status::{self, LinkState};
use std::fs;
use std::io;
use std::path::Path;

/// Reconcile one (source, target) pair in link mode.
///
/// Both paths must be absolute. With `dry_run` set, all status checks and
/// decisions run but no filesystem mutation occurs.
pub fn reconcile(source_abs: &Path, target_abs: &Path, dry_run: bool) -> Outcome {
    let current = status::evaluate(source_abs, target_abs);

    match current.state {
        // Already correct, or a real file we refuse to destroy.
        LinkState::Ok => Outcome::skipped("already linked"),
        LinkState::FileNotLink => Outcome::skipped("file exists at target (left untouched)"),
        LinkState::SourceMissing => Outcome::failed(format!(
            "source missing: {}",
            source_abs.display()
        )),
        LinkState::Error => Outcome::failed(current.reason),
        LinkState::Missing | LinkState::Mismatch => create(source_abs, target_abs, dry_run),
    }
}

/// Create (or re-point) the link at the target.
fn create(source_abs: &Path, target_abs: &Path, dry_run: bool) -> Outcome {
    if dry_run {
        return Outcome::Created {
            fallback_copy: false,
        };
    }

    if let Some(parent) = target_abs.parent()
        && !parent.exists()
        && let Err(e) = fs::create_dir_all(parent)
    {
        return Outcome::failed(format!(
            "failed to create parent directory '{}': {}",
            parent.display(),
            e
        ));
    }

    // Remove whatever entry currently occupies the target (a wrong symlink,
    // possibly dangling). symlink_metadata sees the entry itself.
    if target_abs.symlink_metadata().is_ok()
        && let Err(e) = fs::remove_file(target_abs)
    {
        return Outcome::failed(format!(
            "failed to remove existing target '{}': {}",
            target_abs.display(),
            e
        ));
    }

    match symlink(source_abs, target_abs) {
        Ok(()) => Outcome::Created {
            fallback_copy: false,
        },
        Err(e) if symlink_unsupported(&e) => match fs::copy(source_abs, target_abs) {
            Ok(_) => Outcome::Created {
                fallback_copy: true,
            },
            Err(copy_err) => Outcome::failed(format!(
                "symlink refused ({}) and copy fallback failed: {}",
                e, copy_err
            )),
        },
        Err(e) => Outcome::failed(format!(
            "failed to create link '{}': {}",
            target_abs.display(),
            e
        )),
    }
}

#[cfg(unix)]
fn symlink(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn symlink(source: &Path, target: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(source, target)
}

/// Errors that mean "this platform/filesystem will not symlink here":
/// recover with a copy instead of failing the pair.
fn symlink_unsupported(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::CrossesDevices | io::ErrorKind::Unsupported
    )
}
