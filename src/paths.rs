//! Path normalization for vaultlink.
//!
//! Every path entering status or sync logic is resolved here first: a single
//! leading `~` expands to the user's home directory, relative target paths
//! resolve against the current working directory, and source paths resolve
//! against the vault root. Downstream code only ever sees absolute paths.

use std::path::{Path, PathBuf};

/// Expand a single leading `~` to the user's home directory.
///
/// Only `~` itself and `~/...` are expanded; `~user` forms are left alone.
/// If the home directory cannot be determined, the path is returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        if path == "~" {
            return home;
        }
        if let Some(rest) = path.strip_prefix("~/") {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve a user-supplied target path to an absolute path.
///
/// Expands a leading `~`, then joins relative paths against the current
/// working directory. Already-absolute paths are returned unchanged.
pub fn resolve_target(path: &str) -> PathBuf {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    }
}

/// Resolve a vault-relative source identifier to an absolute path.
pub fn resolve_source(vault_root: &Path, source: &str) -> PathBuf {
    vault_root.join(source)
}
