//! CLI argument parsing for vaultlink.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};

/// Vaultlink: keeps external locations linked or synced to files in a user vault.
///
/// A vault is a plain directory of source-of-truth files. Mappings from vault
/// files to external target paths live in `<vault>/.config/default.toml`
/// (or `<vault>/.config/<hostname>.toml` for machine-specific settings).
#[derive(Parser, Debug)]
#[command(name = "vaultlink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Vault root directory (default: ~/.vault).
    #[arg(long, global = true)]
    pub dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for vaultlink.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect or reconcile configured path mappings.
    ///
    /// Without flags, prints a status report for every configured mapping.
    /// Use --sync to reconcile targets or --remove to delete them.
    Links(LinksArgs),

    /// Write the default configuration file.
    ///
    /// Creates the vault root and .config/ directory if needed and writes a
    /// commented default.toml template. Existing files are left untouched.
    Init(InitArgs),
}

/// Arguments for the `links` command.
#[derive(Parser, Debug)]
pub struct LinksArgs {
    /// Reconcile all configured targets from the vault.
    #[arg(long)]
    pub sync: bool,

    /// Remove all configured targets (asks for confirmation).
    #[arg(long, conflicts_with = "sync")]
    pub remove: bool,

    /// Override the link mode (link, copy).
    #[arg(long)]
    pub mode: Option<String>,

    /// Override the sync provider (copy, rsync, ...).
    #[arg(long)]
    pub provider: Option<String>,

    /// Override the sync direction (forward, reverse, bidirectional).
    #[arg(long)]
    pub direction: Option<String>,

    /// Compute and report all decisions without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompts.
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Print the status report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `init` command.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Compute and report what would be written without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
