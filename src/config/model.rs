//! Config struct definition, loading, and settings resolution.

use super::parser;
use super::types::{
    BUILTIN_COPY_PROVIDER, ConfigValue, Direction, EffectiveSettings, SyncOverrides, SyncSettings,
};
use crate::context::VaultContext;
use crate::error::{Result, VaultError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One configured mapping: a vault-relative source and its ordered targets.
///
/// The first target is the "active" one used for single-target status display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathMapping {
    pub source: String,
    pub targets: Vec<String>,
}

/// An unrecognized section, retained as free-form data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Section {
    pub values: BTreeMap<String, ConfigValue>,
    pub subsections: BTreeMap<String, BTreeMap<String, ConfigValue>>,
}

/// Parsed vault configuration.
///
/// `paths` preserves insertion order, which is also the engine's iteration
/// order. Source keys are unique: re-assigning a source replaces its targets
/// in place. A Config with zero entries is valid and means "nothing
/// configured".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Config {
    pub paths: Vec<PathMapping>,
    pub sync: SyncSettings,
    /// Unrecognized sections, retained rather than rejected.
    pub sections: BTreeMap<String, Section>,
}

impl Config {
    /// Load and parse the configuration file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            VaultError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        Ok(parser::parse(&text))
    }

    /// Load the active configuration for a vault, degrading to an empty
    /// Config when no file exists or the file cannot be read.
    ///
    /// A read failure is reported as a warning but never aborts the run; the
    /// config is re-read fresh on every invocation.
    pub fn load_for(ctx: &VaultContext) -> Self {
        let Some(path) = ctx.active_config_path() else {
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}", e);
                Self::default()
            }
        }
    }

    /// Assign targets for a source, replacing an existing entry in place so
    /// insertion order is preserved.
    pub fn upsert_path(&mut self, source: &str, targets: Vec<String>) {
        if let Some(existing) = self.paths.iter_mut().find(|m| m.source == source) {
            existing.targets = targets;
        } else {
            self.paths.push(PathMapping {
                source: source.to_string(),
                targets,
            });
        }
    }

    /// Look up the targets configured for a source.
    pub fn targets_for(&self, source: &str) -> Option<&[String]> {
        self.paths
            .iter()
            .find(|m| m.source == source)
            .map(|m| m.targets.as_slice())
    }

    /// Mutable access to a free-form section, creating it if needed.
    pub(super) fn section_mut(&mut self, name: &str) -> &mut Section {
        self.sections.entry(name.to_string()).or_default()
    }

    /// Resolve the settings in effect for one source.
    ///
    /// Precedence: CLI flags, then the `[sync.<source>]` override block, then
    /// the global `[sync]` section, then built-in defaults
    /// (`link_mode = link`, `provider = copy`, `direction = forward`).
    pub fn effective_settings(&self, source: &str, cli: &SyncOverrides) -> EffectiveSettings {
        let over = self.sync.overrides.get(source);

        EffectiveSettings {
            link_mode: cli
                .link_mode
                .or(over.and_then(|o| o.link_mode))
                .or(self.sync.link_mode)
                .unwrap_or_default(),
            provider: cli
                .provider
                .clone()
                .or_else(|| over.and_then(|o| o.provider.clone()))
                .or_else(|| self.sync.provider.clone())
                .unwrap_or_else(|| BUILTIN_COPY_PROVIDER.to_string()),
            direction: cli
                .direction
                .or(over.and_then(|o| o.direction))
                .or(self.sync.direction)
                .unwrap_or(Direction::Forward),
            exclude: over
                .and_then(|o| o.exclude.clone())
                .unwrap_or_else(|| self.sync.exclude.clone()),
            dry_run: cli.dry_run || over.and_then(|o| o.dry_run).unwrap_or(self.sync.dry_run),
            tool_command: over
                .and_then(|o| o.tool_command.clone())
                .or_else(|| self.sync.tool_command.clone()),
        }
    }
}
