//! Sync engine: drives status evaluation, reconciliation, and target removal
//! over the configured path mappings.
//!
//! The engine re-reads the configuration fresh on construction, iterates
//! mappings in configuration order, and treats every per-pair failure as
//! recordable rather than fatal: one broken mapping never stops the rest of
//! the run.

mod stats;

pub use stats::{RemoveStats, SyncStats};

use crate::config::{Config, SyncOverrides};
use crate::context::VaultContext;
use crate::error::Result;
use crate::paths;
use crate::providers::{self, Outcome, ToolFactory};
use crate::status::{self, LinkStatus};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Status of one configured target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetStatus {
    /// The target string as configured (before `~` expansion).
    pub target: String,
    /// The resolved absolute path.
    pub resolved: PathBuf,
    #[serde(flatten)]
    pub status: LinkStatus,
    /// Last modification time of whatever sits at the target, if anything.
    pub modified: Option<DateTime<Local>>,
    /// First configured target for the source.
    pub active: bool,
}

/// Status of one configured source and all of its targets.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub source: String,
    pub targets: Vec<TargetStatus>,
}

/// Drives one invocation's worth of work over a vault.
pub struct SyncEngine<'a> {
    ctx: &'a VaultContext,
    config: Config,
}

impl<'a> SyncEngine<'a> {
    /// Build an engine over a vault, reading the active configuration fresh.
    pub fn load(ctx: &'a VaultContext) -> Self {
        let config = Config::load_for(ctx);
        Self { ctx, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Evaluate the current link status of every configured mapping.
    ///
    /// Pure observation: nothing on disk changes. Exclusion patterns do not
    /// apply here; status reports everything that is configured.
    pub fn status(&self) -> Vec<SourceStatus> {
        self.config
            .paths
            .iter()
            .map(|mapping| {
                let source_abs = self.ctx.source_path(&mapping.source);
                let targets = mapping
                    .targets
                    .iter()
                    .enumerate()
                    .map(|(i, raw)| {
                        let resolved = paths::resolve_target(raw);
                        TargetStatus {
                            target: raw.clone(),
                            status: status::evaluate(&source_abs, &resolved),
                            modified: mtime(&resolved),
                            resolved,
                            active: i == 0,
                        }
                    })
                    .collect();
                SourceStatus {
                    source: mapping.source.clone(),
                    targets,
                }
            })
            .collect()
    }

    /// Reconcile every configured (source, target) pair.
    ///
    /// Mappings run in configuration order; each target is resolved,
    /// checked against the exclusion patterns, then dispatched to the
    /// provider selected by that source's effective settings.
    ///
    /// Per-pair failures are recorded in the stats and the run continues;
    /// the only hard error is a tool command that cannot be constructed.
    pub fn sync(&self, cli: &SyncOverrides, tools: &dyn ToolFactory) -> Result<SyncStats> {
        let mut stats = SyncStats::default();

        for mapping in &self.config.paths {
            let source_abs = self.ctx.source_path(&mapping.source);
            let settings = self.config.effective_settings(&mapping.source, cli);
            println!("{}:", mapping.source);

            // One failure per missing source, then on to the next mapping.
            if !source_abs.exists() {
                let outcome = Outcome::failed("file not found in vault");
                report_outcome(&source_abs, &outcome);
                stats.record(&outcome);
                continue;
            }

            for raw in &mapping.targets {
                let target_abs = paths::resolve_target(raw);

                let outcome = if is_excluded(&settings.exclude, &target_abs) {
                    Outcome::skipped("excluded")
                } else if settings.link_mode == crate::config::LinkMode::Link {
                    providers::link::reconcile(&source_abs, &target_abs, settings.dry_run)
                } else if settings.uses_builtin_copy() {
                    providers::copy::reconcile(
                        &source_abs,
                        &target_abs,
                        settings.direction,
                        settings.dry_run,
                    )
                } else {
                    let tool = tools.create(&settings)?;
                    providers::external::reconcile(
                        tool.as_ref(),
                        &source_abs,
                        &target_abs,
                        settings.direction,
                        settings.dry_run,
                    )
                };

                report_outcome(&target_abs, &outcome);
                stats.record(&outcome);
            }
        }

        Ok(stats)
    }

    /// Delete the entries at every configured target path.
    ///
    /// Every configured target is visited; exclusion patterns are a
    /// reconciliation concept and do not apply here. Only the target-side
    /// entries are removed; vault sources are never touched. Confirmation is
    /// the caller's responsibility.
    pub fn remove_targets(&self, dry_run: bool) -> RemoveStats {
        let mut stats = RemoveStats::default();

        for mapping in &self.config.paths {
            for raw in &mapping.targets {
                let target_abs = paths::resolve_target(raw);

                // symlink_metadata sees the entry itself, dangling links included.
                match target_abs.symlink_metadata() {
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        stats.missing += 1;
                    }
                    Err(e) => {
                        eprintln!("  failed to stat {}: {}", target_abs.display(), e);
                        stats.failed += 1;
                    }
                    Ok(_) => {
                        if dry_run {
                            println!("  would remove {}", target_abs.display());
                            stats.removed += 1;
                        } else {
                            match fs::remove_file(&target_abs) {
                                Ok(()) => {
                                    println!("  removed {}", target_abs.display());
                                    stats.removed += 1;
                                }
                                Err(e) => {
                                    eprintln!(
                                        "  failed to remove {}: {}",
                                        target_abs.display(),
                                        e
                                    );
                                    stats.failed += 1;
                                }
                            }
                        }
                    }
                }
            }
        }

        stats
    }
}

/// Whether any exclusion pattern is contained in the target's file name or
/// full resolved path.
fn is_excluded(patterns: &[String], target_abs: &Path) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let full = target_abs.to_string_lossy();
    let name = target_abs
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    patterns
        .iter()
        .any(|p| !p.is_empty() && (name.contains(p.as_str()) || full.contains(p.as_str())))
}

fn report_outcome(target_abs: &Path, outcome: &Outcome) {
    match outcome {
        Outcome::Created { fallback_copy } => {
            if *fallback_copy {
                println!("  linked {} (copied, symlink unavailable)", target_abs.display());
            } else {
                println!("  linked {}", target_abs.display());
            }
        }
        // Copy providers report their own per-leg lines.
        Outcome::Copied { .. } => {}
        Outcome::Skipped { reason } => {
            println!("  skipped {} ({})", target_abs.display(), reason);
        }
        Outcome::Failed { reason } => {
            eprintln!("  failed {}: {}", target_abs.display(), reason);
        }
    }
}

/// Modification time of a path as local time, `None` when it does not exist.
fn mtime(path: &Path) -> Option<DateTime<Local>> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .map(DateTime::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::SystemToolFactory;
    use crate::status::LinkState;
    use crate::test_support::create_test_vault;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Vault with two sources and a config mapping them into `ext/`.
    fn fixture() -> (TempDir, VaultContext, PathBuf) {
        let vault = create_test_vault();
        let ctx = VaultContext::at(vault.path());
        let ext = vault.path().join("ext");

        fs::write(ctx.root.join("a.md"), "alpha").unwrap();
        fs::write(ctx.root.join("b.md"), "beta").unwrap();
        write_config(
            &ctx,
            &format!(
                "[paths]\n\
                 a.md = \"{}\"\n\
                 b.md = \"{}\"\n",
                ext.join("a.md").display(),
                ext.join("b.md").display()
            ),
        );

        (vault, ctx, ext)
    }

    fn write_config(ctx: &VaultContext, text: &str) {
        fs::write(ctx.default_config_path(), text).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn sync_links_every_mapping() {
        let (_vault, ctx, ext) = fixture();

        let engine = SyncEngine::load(&ctx);
        let stats = engine.sync(&SyncOverrides::default(), &SystemToolFactory).unwrap();

        assert_eq!(stats.created, 2);
        assert_eq!(stats.failed, 0);
        for name in ["a.md", "b.md"] {
            let target = ext.join(name);
            assert!(target.symlink_metadata().unwrap().file_type().is_symlink());
        }
    }

    #[cfg(unix)]
    #[test]
    fn second_sync_skips_everything() {
        let (_vault, ctx, _ext) = fixture();

        let engine = SyncEngine::load(&ctx);
        engine.sync(&SyncOverrides::default(), &SystemToolFactory).unwrap();
        let stats = engine.sync(&SyncOverrides::default(), &SystemToolFactory).unwrap();

        assert_eq!(stats.created, 0);
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn excluded_target_is_skipped_not_touched() {
        let (_vault, ctx, ext) = fixture();
        write_config(
            &ctx,
            &format!(
                "[paths]\n\
                 a.md = \"{}\"\n\
                 [sync]\n\
                 exclude = [\"a.md\"]\n",
                ext.join("a.md").display()
            ),
        );

        let engine = SyncEngine::load(&ctx);
        let stats = engine.sync(&SyncOverrides::default(), &SystemToolFactory).unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.created, 0);
        assert!(!ext.join("a.md").exists());
    }

    #[test]
    fn exclusion_matches_substring_of_full_path() {
        let (_vault, ctx, _ext) = fixture();
        // "ext" appears in the directory component of every target.
        write_config(
            &ctx,
            &format!(
                "{}\n[sync]\nexclude = [\"ext\"]\n",
                fs::read_to_string(ctx.default_config_path()).unwrap()
            ),
        );

        let engine = SyncEngine::load(&ctx);
        let stats = engine.sync(&SyncOverrides::default(), &SystemToolFactory).unwrap();

        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.created + stats.copied + stats.failed, 0);
    }

    #[test]
    fn per_source_override_switches_provider() {
        let (_vault, ctx, ext) = fixture();
        write_config(
            &ctx,
            &format!(
                "[paths]\n\
                 a.md = \"{}\"\n\
                 [sync.a.md]\n\
                 link_mode = \"copy\"\n",
                ext.join("a.md").display()
            ),
        );

        let engine = SyncEngine::load(&ctx);
        let stats = engine.sync(&SyncOverrides::default(), &SystemToolFactory).unwrap();

        assert_eq!(stats.copied, 1);
        let target = ext.join("a.md");
        // A real file, not a symlink.
        assert!(!target.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&target).unwrap(), "alpha");
    }

    #[cfg(unix)]
    #[test]
    fn missing_source_fails_pair_but_run_continues() {
        let (_vault, ctx, ext) = fixture();
        fs::remove_file(ctx.root.join("a.md")).unwrap();

        let engine = SyncEngine::load(&ctx);
        let stats = engine.sync(&SyncOverrides::default(), &SystemToolFactory).unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.created, 1);
        assert!(ext.join("b.md").symlink_metadata().is_ok());
    }

    #[test]
    fn dry_run_decides_without_mutating() {
        let (_vault, ctx, ext) = fixture();

        let engine = SyncEngine::load(&ctx);
        let cli = SyncOverrides {
            dry_run: true,
            ..Default::default()
        };
        let stats = engine.sync(&cli, &SystemToolFactory).unwrap();

        // Same decisions as a live run, zero filesystem changes.
        assert_eq!(stats.created, 2);
        assert!(!ext.exists());
    }

    #[cfg(unix)]
    #[test]
    fn status_reports_mixed_states() {
        let (_vault, ctx, ext) = fixture();

        let engine = SyncEngine::load(&ctx);
        engine.sync(&SyncOverrides::default(), &SystemToolFactory).unwrap();
        fs::remove_file(ext.join("b.md")).unwrap();

        let statuses = engine.status();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].source, "a.md");
        assert_eq!(statuses[0].targets[0].status.state, LinkState::Ok);
        assert!(statuses[0].targets[0].active);
        assert_eq!(statuses[1].targets[0].status.state, LinkState::Missing);
    }

    #[cfg(unix)]
    #[test]
    fn status_covers_all_targets_of_a_source() {
        let (_vault, ctx, ext) = fixture();
        write_config(
            &ctx,
            &format!(
                "[paths]\n\
                 a.md = [\"{}\", \"{}\"]\n",
                ext.join("one/a.md").display(),
                ext.join("two/a.md").display()
            ),
        );

        let engine = SyncEngine::load(&ctx);
        let statuses = engine.status();
        assert_eq!(statuses[0].targets.len(), 2);
        assert!(statuses[0].targets[0].active);
        assert!(!statuses[0].targets[1].active);
    }

    #[cfg(unix)]
    #[test]
    fn remove_deletes_linked_targets_only() {
        let (_vault, ctx, ext) = fixture();

        let engine = SyncEngine::load(&ctx);
        engine.sync(&SyncOverrides::default(), &SystemToolFactory).unwrap();

        let stats = engine.remove_targets(false);
        assert_eq!(stats.removed, 2);
        assert_eq!(stats.failed, 0);
        assert!(!ext.join("a.md").symlink_metadata().is_ok());
        // Vault sources stay put.
        assert!(ctx.root.join("a.md").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn remove_dry_run_leaves_targets_in_place() {
        let (_vault, ctx, ext) = fixture();

        let engine = SyncEngine::load(&ctx);
        engine.sync(&SyncOverrides::default(), &SystemToolFactory).unwrap();

        let stats = engine.remove_targets(true);
        assert_eq!(stats.removed, 2);
        assert!(ext.join("a.md").symlink_metadata().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn per_source_exclude_overrides_global() {
        let (_vault, ctx, ext) = fixture();
        write_config(
            &ctx,
            &format!(
                "[paths]\n\
                 a.md = \"{}\"\n\
                 b.md = \"{}\"\n\
                 [sync.a.md]\n\
                 exclude = [\"a.md\"]\n",
                ext.join("a.md").display(),
                ext.join("b.md").display()
            ),
        );

        let engine = SyncEngine::load(&ctx);
        let stats = engine.sync(&SyncOverrides::default(), &SystemToolFactory).unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.created, 1);
        assert!(!ext.join("a.md").exists());
        assert!(ext.join("b.md").symlink_metadata().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn remove_covers_excluded_targets_too() {
        let (_vault, ctx, ext) = fixture();

        let engine = SyncEngine::load(&ctx);
        engine.sync(&SyncOverrides::default(), &SystemToolFactory).unwrap();

        // Exclusion only scopes reconciliation; removal visits everything.
        write_config(
            &ctx,
            &format!(
                "[paths]\n\
                 a.md = \"{}\"\n\
                 [sync]\n\
                 exclude = [\"a.md\"]\n",
                ext.join("a.md").display()
            ),
        );

        let engine = SyncEngine::load(&ctx);
        let stats = engine.remove_targets(false);
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.removed + stats.missing + stats.failed, 1);
        assert!(ext.join("a.md").symlink_metadata().is_err());
    }

    #[test]
    fn remove_counts_absent_targets_as_missing() {
        let (_vault, ctx, _ext) = fixture();

        let engine = SyncEngine::load(&ctx);
        let stats = engine.remove_targets(false);
        assert_eq!(stats.missing, 2);
        assert_eq!(stats.removed, 0);
    }

    #[test]
    fn exclusion_helper_matches_name_and_path() {
        let target = Path::new("/home/u/ext/notes/a.md");
        assert!(is_excluded(&["a.md".to_string()], target));
        assert!(is_excluded(&["notes".to_string()], target));
        assert!(is_excluded(&[".md".to_string()], target));
        assert!(!is_excluded(&["b.md".to_string()], target));
        assert!(!is_excluded(&[], target));
    }
}
