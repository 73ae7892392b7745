//! Error types for the vaultlink CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//!
//! Most per-mapping failures during a sync run are not errors in this sense:
//! they are recorded as tagged outcomes in the run stats and the run continues.
//! The variants here cover the cases that abort a whole command.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for vaultlink operations.
///
/// Each variant maps to a specific exit code.
#[derive(Error, Debug)]
pub enum VaultError {
    /// User provided invalid arguments or the vault is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// The configuration file could not be read.
    #[error("Config read failed: {0}")]
    ConfigError(String),

    /// The external sync tool could not be constructed or invoked.
    #[error("Sync tool failed: {0}")]
    ToolError(String),
}

impl VaultError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            VaultError::UserError(_) => exit_codes::USER_ERROR,
            VaultError::ConfigError(_) => exit_codes::CONFIG_FAILURE,
            VaultError::ToolError(_) => exit_codes::TOOL_FAILURE,
        }
    }
}

/// Result type alias for vaultlink operations.
pub type Result<T> = std::result::Result<T, VaultError>;
