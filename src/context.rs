//! Vault context resolution for vaultlink.
//!
//! This module locates the vault root (from `--dir` or the default location
//! under the user's home directory) and the configuration files inside it.
//!
//! All commands must use this module to locate vault state so that source
//! paths and config files are always resolved against the same root,
//! regardless of where the command is invoked from.

use crate::error::{Result, VaultError};
use crate::paths;
use std::path::{Path, PathBuf};

/// Default vault directory name under the user's home directory.
pub const DEFAULT_VAULT_DIR: &str = ".vault";

/// Configuration subdirectory name within the vault.
pub const CONFIG_DIR: &str = ".config";

/// Name of the fallback configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "default.toml";

/// Resolved paths for the vaultlink context.
///
/// All paths are absolute.
#[derive(Debug, Clone)]
pub struct VaultContext {
    /// Absolute path to the vault root directory.
    pub root: PathBuf,

    /// Absolute path to the configuration directory (`{root}/.config/`).
    pub config_dir: PathBuf,
}

impl VaultContext {
    /// Resolve the vault context from an optional `--dir` override.
    ///
    /// The override may use `~` shorthand or a relative path; without it the
    /// vault lives at `~/.vault`. This does not require the root to exist;
    /// commands that operate on an existing vault call [`ensure_exists`]
    /// afterwards.
    ///
    /// [`ensure_exists`]: VaultContext::ensure_exists
    pub fn resolve(dir: Option<&str>) -> Result<Self> {
        let root = match dir {
            Some(dir) => paths::resolve_target(dir),
            None => dirs::home_dir()
                .ok_or_else(|| {
                    VaultError::UserError(
                        "could not determine home directory; pass --dir explicitly".to_string(),
                    )
                })?
                .join(DEFAULT_VAULT_DIR),
        };

        Ok(Self::at(root))
    }

    /// Build a context rooted at a specific directory.
    pub fn at<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        let config_dir = root.join(CONFIG_DIR);
        Self { root, config_dir }
    }

    /// Ensure the vault root exists, returning an error if not.
    ///
    /// This is the only condition that is fatal to the whole process: every
    /// command except `init` requires an existing vault root.
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(VaultError::UserError(format!(
                "vault directory not found: {}\n\
                 Run `vaultlink init --dir {}` to create it.",
                self.root.display(),
                self.root.display()
            )));
        }
        Ok(())
    }

    /// Path to the fallback configuration file.
    pub fn default_config_path(&self) -> PathBuf {
        self.config_dir.join(DEFAULT_CONFIG_FILE)
    }

    /// Path to the machine-specific configuration file, if the hostname is known.
    pub fn host_config_path(&self) -> Option<PathBuf> {
        short_hostname().map(|host| self.config_dir.join(format!("{}.toml", host)))
    }

    /// The configuration file to read for this invocation.
    ///
    /// A machine-specific file fully replaces the default file; it is never
    /// merged with it. Returns `None` when neither file exists.
    pub fn active_config_path(&self) -> Option<PathBuf> {
        if let Some(host_path) = self.host_config_path()
            && host_path.is_file()
        {
            return Some(host_path);
        }

        let default_path = self.default_config_path();
        default_path.is_file().then_some(default_path)
    }

    /// Resolve a vault-relative source identifier to an absolute path.
    pub fn source_path(&self, source: &str) -> PathBuf {
        paths::resolve_source(&self.root, source)
    }
}

/// The local machine's short hostname: first dot-separated label, lowercased.
pub fn short_hostname() -> Option<String> {
    let host = hostname::get().ok()?;
    let host = host.to_string_lossy();
    let short = host.split('.').next().unwrap_or(&host);
    if short.is_empty() {
        return None;
    }
    Some(short.to_lowercase())
}

/// Convenience function to resolve a context over an existing vault.
///
/// Use this in every command except `init`, which may create the root itself.
pub fn require_vault(dir: Option<&str>) -> Result<VaultContext> {
    let ctx = VaultContext::resolve(dir)?;
    ctx.ensure_exists()?;
    Ok(ctx)
}
