//! The `init` command: create the vault layout and a starter config.

use crate::cli::InitArgs;
use crate::context::VaultContext;
use crate::error::{Result, VaultError};
use std::fs;

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# vaultlink configuration
#
# Map vault files to external locations under [paths]:
#   memory.md = \"~/notes/memory.md\"
#   lessons.md = [\"~/a/lessons.md\", \"~/b/lessons.md\"]
#
# Machine-specific settings go in <hostname>.toml next to this file and
# fully replace this file when present.

[paths]

[sync]
# link_mode = \"link\"        # link | copy
# provider = \"copy\"         # copy | rsync | any external tool
# direction = \"forward\"     # forward | reverse | bidirectional
# exclude = [\".DS_Store\"]
# dry_run = false
";

pub fn run(dir: Option<&str>, args: &InitArgs) -> Result<()> {
    let ctx = VaultContext::resolve(dir)?;
    let config_path = ctx.default_config_path();

    if args.dry_run {
        if !ctx.config_dir.is_dir() {
            println!("Would create {}", ctx.config_dir.display());
        }
        if config_path.is_file() {
            println!("Config already exists: {}", config_path.display());
        } else {
            println!("Would write {}", config_path.display());
        }
        return Ok(());
    }

    fs::create_dir_all(&ctx.config_dir).map_err(|e| {
        VaultError::ConfigError(format!(
            "failed to create {}: {}",
            ctx.config_dir.display(),
            e
        ))
    })?;

    if config_path.is_file() {
        println!("Config already exists: {}", config_path.display());
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE).map_err(|e| {
        VaultError::ConfigError(format!("failed to write {}: {}", config_path.display(), e))
    })?;
    println!("Wrote {}", config_path.display());
    Ok(())
}
