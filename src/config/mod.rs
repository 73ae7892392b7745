//! Configuration model for vaultlink.
//!
//! This module defines the Config struct produced from the vault's
//! declarative configuration file (`<vault>/.config/default.toml` or the
//! machine-specific `<hostname>.toml`). Parsing is deliberately permissive:
//! malformed lines are skipped, unknown sections and keys are retained as
//! free-form data, and a missing or unreadable file degrades to an empty
//! configuration.

mod model;
mod parser;
pub mod types;


// Re-export public API
pub use model::{Config, PathMapping, Section};
pub use parser::parse;
pub use types::{
    ConfigValue, Direction, EffectiveSettings, LinkMode, SyncOverride, SyncOverrides, SyncSettings,
};
