//! Exit code constants for the vaultlink CLI.
//!
//! - 0: Success
//! - 1: User error (missing vault root, bad argument values)
//! - 2: Configuration failure
//! - 3: External tool failure
//!
//! Per-mapping sync failures are reported in the run summary and do not
//! change the process exit code; only a missing vault root or invalid
//! invocation is fatal.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: missing vault root, bad argument values, or declined input.
pub const USER_ERROR: i32 = 1;

/// Configuration failure: the chosen config file could not be read.
pub const CONFIG_FAILURE: i32 = 2;

/// External tool failure: the sync tool command could not be constructed or run.
pub const TOOL_FAILURE: i32 = 3;
