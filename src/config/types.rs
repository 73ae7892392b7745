//! Configuration types and defaults for vaultlink.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Name of the built-in timestamp-copy provider. Any other provider name is
/// treated as an external tool to invoke.
pub const BUILTIN_COPY_PROVIDER: &str = "copy";

/// How a mapping is reconciled: symbolic link or real file copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// Create a symbolic link at the target (default).
    #[default]
    Link,
    /// Copy file contents between source and target.
    Copy,
}

impl LinkMode {
    /// Parse a link mode from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "link" => Some(Self::Link),
            "copy" => Some(Self::Copy),
            _ => None,
        }
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkMode::Link => write!(f, "link"),
            LinkMode::Copy => write!(f, "copy"),
        }
    }
}

/// Which legs are considered during copy-mode reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Vault to targets (default).
    #[default]
    Forward,
    /// Targets back into the vault.
    Reverse,
    /// Both legs, newest modification wins per leg.
    Bidirectional,
}

impl Direction {
    /// Parse a direction from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "forward" => Some(Self::Forward),
            "reverse" => Some(Self::Reverse),
            "bidirectional" => Some(Self::Bidirectional),
            _ => None,
        }
    }

    /// Whether the source-to-target leg runs under this direction.
    pub fn includes_forward(self) -> bool {
        matches!(self, Direction::Forward | Direction::Bidirectional)
    }

    /// Whether the target-to-source leg runs under this direction.
    pub fn includes_reverse(self) -> bool {
        matches!(self, Direction::Reverse | Direction::Bidirectional)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Reverse => write!(f, "reverse"),
            Direction::Bidirectional => write!(f, "bidirectional"),
        }
    }
}

/// A typed configuration value.
///
/// Values are typed by a fixed precedence at parse time: quoted string,
/// boolean literal, bracketed list, numeric literal, raw string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Str(String),
    Bool(bool),
    Number(f64),
    List(Vec<String>),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Interpret this value as a target list for a `[paths]` entry.
    ///
    /// A plain string is a single target; a list is multiple targets in
    /// order. Other value types degrade to their display form rather than
    /// being rejected.
    pub fn into_targets(self) -> Vec<String> {
        match self {
            ConfigValue::Str(s) => vec![s],
            ConfigValue::List(items) => items,
            ConfigValue::Bool(b) => vec![b.to_string()],
            ConfigValue::Number(n) => vec![n.to_string()],
        }
    }
}

/// Global `[sync]` settings.
///
/// All recognized fields are optional so that per-source overrides and CLI
/// flags can layer on top without ambiguity; unresolved fields fall back to
/// built-in defaults (`link`, `copy`, `forward`). Unrecognized keys are
/// retained in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncSettings {
    pub link_mode: Option<LinkMode>,
    pub provider: Option<String>,
    pub direction: Option<Direction>,
    /// Ordered substring patterns; matching targets are skipped.
    pub exclude: Vec<String>,
    pub dry_run: bool,
    /// Explicit command line for the external tool (shell-words syntax).
    pub tool_command: Option<String>,
    /// Unrecognized `[sync]` keys, retained as free-form data.
    pub extra: BTreeMap<String, ConfigValue>,
    /// Per-source overrides from `[sync.<source>]` subsections.
    pub overrides: BTreeMap<String, SyncOverride>,
}

/// A per-source override block: any subset of the `[sync]` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncOverride {
    pub link_mode: Option<LinkMode>,
    pub provider: Option<String>,
    pub direction: Option<Direction>,
    /// Replaces the global exclusion list for this source when present.
    pub exclude: Option<Vec<String>>,
    pub dry_run: Option<bool>,
    pub tool_command: Option<String>,
    /// Unrecognized keys, retained as free-form data.
    pub extra: BTreeMap<String, ConfigValue>,
}

/// Per-invocation overrides from CLI flags.
///
/// These take precedence over both per-source overrides and global settings.
/// `dry_run` is sticky: either the flag or the config can turn it on.
#[derive(Debug, Clone, Default)]
pub struct SyncOverrides {
    pub link_mode: Option<LinkMode>,
    pub provider: Option<String>,
    pub direction: Option<Direction>,
    pub dry_run: bool,
}

/// Fully resolved settings for one source, after layering CLI overrides,
/// per-source overrides, global settings, and built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveSettings {
    pub link_mode: LinkMode,
    pub provider: String,
    pub direction: Direction,
    pub exclude: Vec<String>,
    pub dry_run: bool,
    pub tool_command: Option<String>,
}

impl EffectiveSettings {
    /// Whether reconciliation should go through the built-in timestamp-copy
    /// provider rather than an external tool.
    pub fn uses_builtin_copy(&self) -> bool {
        self.provider == BUILTIN_COPY_PROVIDER
    }
}
