//! External tool provider: delegates reconciliation to a local
//! synchronization utility such as rsync, invoked as a subprocess.
//!
//! The subprocess boundary sits behind the [`ToolRunner`] capability trait so
//! the engine and tests never shell out directly. When the tool is not
//! installed, reconciliation falls back to the timestamp copy provider with a
//! user-visible warning.
//!
//! Dry-run passes the tool's own no-mutation flag instead of skipping the
//! invocation, so command syntax errors still surface during a preview.
//!
//! Invocations block on subprocess completion with no timeout; a hung tool
//! hangs the sync. TODO: thread an optional timeout through SystemTool.

use super::{Outcome, copy};
use crate::config::{Direction, EffectiveSettings};
use crate::error::{Result, VaultError};
use std::path::Path;
use std::process::Command;

/// Which way a single tool invocation moves data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// Source to target.
    Push,
    /// Target to source.
    Pull,
}

/// Capability interface over the external synchronization tool.
pub trait ToolRunner {
    /// Display name for warnings and progress output.
    fn name(&self) -> &str;

    /// Whether the tool can be invoked on this machine.
    fn is_available(&self) -> bool;

    /// Run the tool once for one leg of one (source, target) pair.
    fn invoke(&self, source: &Path, target: &Path, leg: Leg, dry_run: bool) -> Result<()>;
}

/// Builds a [`ToolRunner`] for the effective settings of one source.
///
/// A factory rather than a single runner because per-source overrides can
/// select different providers within the same run.
pub trait ToolFactory {
    fn create(&self, settings: &EffectiveSettings) -> Result<Box<dyn ToolRunner>>;
}

/// Real subprocess-backed tool runner.
#[derive(Debug, Clone)]
pub struct SystemTool {
    program: String,
    args: Vec<String>,
}

impl SystemTool {
    /// Build the tool command line from the effective settings.
    ///
    /// `tool_command` (shell-words syntax) wins when configured; otherwise
    /// the provider name selects a built-in default command line.
    pub fn from_settings(settings: &EffectiveSettings) -> Result<Self> {
        let words = match &settings.tool_command {
            Some(command) => shell_words::split(command).map_err(|e| {
                VaultError::ToolError(format!(
                    "failed to parse tool_command '{}': {}\n\
                     Fix: check for unmatched quotes or invalid escape sequences.",
                    command, e
                ))
            })?,
            None => default_command(&settings.provider),
        };

        let mut words = words.into_iter();
        let program = words.next().ok_or_else(|| {
            VaultError::ToolError("tool command is empty after parsing".to_string())
        })?;

        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

/// Default command line for a provider name.
fn default_command(provider: &str) -> Vec<String> {
    match provider {
        "rsync" => vec![
            "rsync".to_string(),
            "-a".to_string(),
            "--update".to_string(),
        ],
        other => vec![other.to_string()],
    }
}

impl ToolRunner for SystemTool {
    fn name(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn invoke(&self, source: &Path, target: &Path, leg: Leg, dry_run: bool) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);

        if dry_run {
            command.arg("--dry-run");
        }

        match leg {
            Leg::Push => command.arg(source).arg(target),
            Leg::Pull => command.arg(target).arg(source),
        };

        let output = command.output().map_err(|e| {
            VaultError::ToolError(format!(
                "failed to execute {}: {}\n\
                 Fix: ensure the tool is installed and in PATH.",
                self.program, e
            ))
        })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let message = if stderr.is_empty() { stdout } else { stderr };
            Err(VaultError::ToolError(format!(
                "{} failed (exit code {}): {}",
                self.program,
                output.status.code().unwrap_or(-1),
                message
            )))
        }
    }
}

/// Factory for [`SystemTool`] runners.
pub struct SystemToolFactory;

impl ToolFactory for SystemToolFactory {
    fn create(&self, settings: &EffectiveSettings) -> Result<Box<dyn ToolRunner>> {
        Ok(Box::new(SystemTool::from_settings(settings)?))
    }
}

/// Reconcile one (source, target) pair through the external tool.
///
/// Bidirectional runs the push leg and then the pull leg, matching the
/// timestamp copy provider's behavior. An unavailable tool falls back to the
/// copy provider entirely.
pub fn reconcile(
    tool: &dyn ToolRunner,
    source_abs: &Path,
    target_abs: &Path,
    direction: Direction,
    dry_run: bool,
) -> Outcome {
    if !tool.is_available() {
        eprintln!(
            "Warning: {} not available, falling back to copy",
            tool.name()
        );
        return copy::reconcile(source_abs, target_abs, direction, dry_run);
    }

    let mut files = 0u32;

    if direction.includes_forward() {
        match tool.invoke(source_abs, target_abs, Leg::Push, dry_run) {
            Ok(()) => {
                println!("  {} -> {}", tool.name(), target_abs.display());
                files += 1;
            }
            Err(e) => return Outcome::failed(e.to_string()),
        }
    }

    if direction.includes_reverse() {
        match tool.invoke(source_abs, target_abs, Leg::Pull, dry_run) {
            Ok(()) => {
                println!("  {} <- {}", tool.name(), target_abs.display());
                files += 1;
            }
            Err(e) => return Outcome::failed(e.to_string()),
        }
    }

    Outcome::Copied { files }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkMode;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Recording fake standing in for the subprocess runner.
    struct FakeTool {
        available: bool,
        fail_invocations: bool,
        invocations: RefCell<Vec<(Leg, bool)>>,
    }

    impl FakeTool {
        fn available() -> Self {
            Self {
                available: true,
                fail_invocations: false,
                invocations: RefCell::new(Vec::new()),
            }
        }

        fn unavailable() -> Self {
            Self {
                available: false,
                fail_invocations: false,
                invocations: RefCell::new(Vec::new()),
            }
        }
    }

    impl ToolRunner for FakeTool {
        fn name(&self) -> &str {
            "faketool"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn invoke(&self, _source: &Path, _target: &Path, leg: Leg, dry_run: bool) -> Result<()> {
            self.invocations.borrow_mut().push((leg, dry_run));
            if self.fail_invocations {
                Err(VaultError::ToolError("faketool exploded".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn settings(provider: &str, tool_command: Option<&str>) -> EffectiveSettings {
        EffectiveSettings {
            link_mode: LinkMode::Copy,
            provider: provider.to_string(),
            direction: Direction::Forward,
            exclude: Vec::new(),
            dry_run: false,
            tool_command: tool_command.map(str::to_string),
        }
    }

    #[test]
    fn forward_runs_push_leg_only() {
        let tool = FakeTool::available();
        let outcome = reconcile(
            &tool,
            Path::new("/v/a.md"),
            Path::new("/e/a.md"),
            Direction::Forward,
            false,
        );
        assert_eq!(outcome, Outcome::Copied { files: 1 });
        assert_eq!(*tool.invocations.borrow(), vec![(Leg::Push, false)]);
    }

    #[test]
    fn reverse_runs_pull_leg_only() {
        let tool = FakeTool::available();
        let outcome = reconcile(
            &tool,
            Path::new("/v/a.md"),
            Path::new("/e/a.md"),
            Direction::Reverse,
            false,
        );
        assert_eq!(outcome, Outcome::Copied { files: 1 });
        assert_eq!(*tool.invocations.borrow(), vec![(Leg::Pull, false)]);
    }

    #[test]
    fn bidirectional_runs_both_legs() {
        let tool = FakeTool::available();
        let outcome = reconcile(
            &tool,
            Path::new("/v/a.md"),
            Path::new("/e/a.md"),
            Direction::Bidirectional,
            false,
        );
        assert_eq!(outcome, Outcome::Copied { files: 2 });
        assert_eq!(
            *tool.invocations.borrow(),
            vec![(Leg::Push, false), (Leg::Pull, false)]
        );
    }

    #[test]
    fn dry_run_still_invokes_with_flag() {
        let tool = FakeTool::available();
        reconcile(
            &tool,
            Path::new("/v/a.md"),
            Path::new("/e/a.md"),
            Direction::Forward,
            true,
        );
        assert_eq!(*tool.invocations.borrow(), vec![(Leg::Push, true)]);
    }

    #[test]
    fn invocation_failure_fails_pair() {
        let mut tool = FakeTool::available();
        tool.fail_invocations = true;

        let outcome = reconcile(
            &tool,
            Path::new("/v/a.md"),
            Path::new("/e/a.md"),
            Direction::Forward,
            false,
        );
        assert!(matches!(outcome, Outcome::Failed { .. }));
    }

    #[test]
    fn unavailable_tool_falls_back_to_copy() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.md");
        let target = temp.path().join("ext").join("a.md");
        fs::write(&source, "content").unwrap();

        let tool = FakeTool::unavailable();
        let outcome = reconcile(&tool, &source, &target, Direction::Forward, false);

        // Copy provider took over and actually copied the file.
        assert_eq!(outcome, Outcome::Copied { files: 1 });
        assert_eq!(fs::read_to_string(&target).unwrap(), "content");
        assert!(tool.invocations.borrow().is_empty());
    }

    #[test]
    fn system_tool_default_rsync_command() {
        let tool = SystemTool::from_settings(&settings("rsync", None)).unwrap();
        assert_eq!(tool.program, "rsync");
        assert_eq!(tool.args, vec!["-a", "--update"]);
    }

    #[test]
    fn system_tool_other_provider_uses_name() {
        let tool = SystemTool::from_settings(&settings("git-sync", None)).unwrap();
        assert_eq!(tool.program, "git-sync");
        assert!(tool.args.is_empty());
    }

    #[test]
    fn system_tool_parses_tool_command() {
        let tool =
            SystemTool::from_settings(&settings("rsync", Some("rsync -az --delete"))).unwrap();
        assert_eq!(tool.program, "rsync");
        assert_eq!(tool.args, vec!["-az", "--delete"]);
    }

    #[test]
    fn system_tool_rejects_unparseable_command() {
        let result = SystemTool::from_settings(&settings("rsync", Some("rsync 'unterminated")));
        assert!(matches!(result, Err(VaultError::ToolError(_))));
    }

    #[test]
    fn system_tool_rejects_empty_command() {
        let result = SystemTool::from_settings(&settings("rsync", Some("  ")));
        assert!(matches!(result, Err(VaultError::ToolError(_))));
    }
}
