//! The `links` command: status report, reconciliation, and target removal.

use crate::cli::LinksArgs;
use crate::config::{Direction, LinkMode, SyncOverrides};
use crate::context;
use crate::engine::{SourceStatus, SyncEngine};
use crate::error::{Result, VaultError};
use crate::prompt;
use crate::providers::SystemToolFactory;
use crate::status::LinkState;

pub fn run(dir: Option<&str>, args: &LinksArgs) -> Result<()> {
    let ctx = context::require_vault(dir)?;
    let engine = SyncEngine::load(&ctx);

    if args.sync {
        sync(&engine, args)
    } else if args.remove {
        remove(&engine, args)
    } else {
        report(&engine, &ctx, args)
    }
}

/// Translate CLI flag strings into typed per-invocation overrides.
///
/// Unlike config files, where an invalid value is retained but ignored, an
/// invalid flag value is a hard user error.
fn overrides(args: &LinksArgs) -> Result<SyncOverrides> {
    let link_mode = match &args.mode {
        Some(s) => Some(LinkMode::from_str(s).ok_or_else(|| {
            VaultError::UserError(format!(
                "invalid --mode '{}': expected 'link' or 'copy'",
                s
            ))
        })?),
        None => None,
    };

    let direction = match &args.direction {
        Some(s) => Some(Direction::from_str(s).ok_or_else(|| {
            VaultError::UserError(format!(
                "invalid --direction '{}': expected 'forward', 'reverse', or 'bidirectional'",
                s
            ))
        })?),
        None => None,
    };

    Ok(SyncOverrides {
        link_mode,
        provider: args.provider.clone(),
        direction,
        dry_run: args.dry_run,
    })
}

fn sync(engine: &SyncEngine, args: &LinksArgs) -> Result<()> {
    let cli = overrides(args)?;
    if cli.dry_run {
        println!("Dry run: no files will be changed.");
    }

    let stats = engine.sync(&cli, &SystemToolFactory)?;

    println!();
    println!(
        "{} created, {} copied, {} skipped, {} failed",
        stats.created, stats.copied, stats.skipped, stats.failed
    );
    // Per-pair failures are already reported and do not fail the invocation.
    Ok(())
}

fn remove(engine: &SyncEngine, args: &LinksArgs) -> Result<()> {
    let target_count: usize = engine
        .config()
        .paths
        .iter()
        .map(|m| m.targets.len())
        .sum();

    // Nothing configured means nothing to confirm.
    if target_count > 0 && !args.dry_run && !args.yes {
        let question = format!("Remove {} configured target(s)?", target_count);
        if !prompt::confirm(&question, false) {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let stats = engine.remove_targets(args.dry_run);
    println!();
    println!(
        "{} removed, {} already absent, {} failed",
        stats.removed, stats.missing, stats.failed
    );
    Ok(())
}

fn report(engine: &SyncEngine, ctx: &context::VaultContext, args: &LinksArgs) -> Result<()> {
    let statuses = engine.status();

    // JSON stays machine-readable: an empty config is an empty array.
    if args.json {
        let json = serde_json::to_string_pretty(&statuses)
            .map_err(|e| VaultError::UserError(format!("failed to encode report: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    if statuses.is_empty() {
        println!(
            "No paths configured. Add entries under [paths] in {}",
            ctx.default_config_path().display()
        );
        return Ok(());
    }

    print_report(&statuses);
    Ok(())
}

fn print_report(statuses: &[SourceStatus]) {
    for status in statuses {
        println!("{}:", status.source);
        for target in &status.targets {
            let marker = if target.active { "*" } else { " " };
            let modified = target
                .modified
                .map(|m| format!(", modified {}", m.format("%Y-%m-%d %H:%M")))
                .unwrap_or_default();
            println!(
                "  {} {} [{}{}]",
                marker, target.target, target.status.state, modified
            );
            // States beyond plain ok/missing carry a reason worth surfacing.
            if !matches!(target.status.state, LinkState::Ok | LinkState::Missing) {
                println!("      {}", target.status.reason);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use crate::context::VaultContext;
    use crate::test_support::create_test_vault;
    use clap::Parser;
    use std::fs;

    fn links_args(argv: &[&str]) -> LinksArgs {
        let mut full = vec!["vaultlink", "links"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Links(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn invalid_mode_flag_is_a_user_error() {
        let result = overrides(&links_args(&["--mode", "junction"]));
        assert!(matches!(result, Err(VaultError::UserError(_))));
    }

    #[test]
    fn invalid_direction_flag_is_a_user_error() {
        let result = overrides(&links_args(&["--direction", "sideways"]));
        assert!(matches!(result, Err(VaultError::UserError(_))));
    }

    #[test]
    fn flags_translate_to_overrides() {
        let cli = overrides(&links_args(&[
            "--mode",
            "copy",
            "--provider",
            "rsync",
            "--direction",
            "bidirectional",
            "--dry-run",
        ]))
        .unwrap();
        assert_eq!(cli.link_mode, Some(LinkMode::Copy));
        assert_eq!(cli.provider.as_deref(), Some("rsync"));
        assert_eq!(cli.direction, Some(Direction::Bidirectional));
        assert!(cli.dry_run);
    }

    #[test]
    fn missing_vault_is_a_user_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("absent");
        let result = run(dir.to_str(), &links_args(&[]));
        assert!(matches!(result, Err(VaultError::UserError(_))));
    }

    #[test]
    fn empty_config_reports_and_succeeds() {
        let vault = create_test_vault();
        let result = run(vault.path().to_str(), &links_args(&[]));
        assert!(result.is_ok());
    }

    #[test]
    fn empty_config_json_report_is_empty_array() {
        let vault = create_test_vault();
        let ctx = VaultContext::at(vault.path());

        let engine = SyncEngine::load(&ctx);
        assert_eq!(serde_json::to_string_pretty(&engine.status()).unwrap(), "[]");

        let result = run(vault.path().to_str(), &links_args(&["--json"]));
        assert!(result.is_ok());
    }

    #[test]
    fn empty_config_remove_skips_prompt() {
        let vault = create_test_vault();
        // No targets, so no confirmation prompt blocks the run.
        let result = run(vault.path().to_str(), &links_args(&["--remove"]));
        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn sync_and_remove_round_trip() {
        let vault = create_test_vault();
        let ctx = VaultContext::at(vault.path());
        let target = vault.path().join("ext").join("a.md");

        fs::write(ctx.root.join("a.md"), "alpha").unwrap();
        fs::write(
            ctx.default_config_path(),
            format!("[paths]\na.md = \"{}\"\n", target.display()),
        )
        .unwrap();

        run(vault.path().to_str(), &links_args(&["--sync"])).unwrap();
        assert!(target.symlink_metadata().unwrap().file_type().is_symlink());

        // --yes bypasses the confirmation prompt.
        run(vault.path().to_str(), &links_args(&["--remove", "-y"])).unwrap();
        assert!(target.symlink_metadata().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn json_report_serializes_states() {
        let vault = create_test_vault();
        let ctx = VaultContext::at(vault.path());
        let target = vault.path().join("ext").join("a.md");

        fs::write(ctx.root.join("a.md"), "alpha").unwrap();
        fs::write(
            ctx.default_config_path(),
            format!("[paths]\na.md = \"{}\"\n", target.display()),
        )
        .unwrap();

        let engine = SyncEngine::load(&ctx);
        let json = serde_json::to_string(&engine.status()).unwrap();
        assert!(json.contains("\"source\":\"a.md\""));
        assert!(json.contains("\"state\":\"missing\""));
    }
}
