//! Command dispatch and handlers for vaultlink.

pub mod init;
pub mod links;

use crate::cli::{Cli, Command};
use crate::error::Result;

/// Route a parsed invocation to its handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Links(args) => links::run(cli.dir.as_deref(), &args),
        Command::Init(args) => init::run(cli.dir.as_deref(), &args),
    }
}
