//! Overwrite confirmation before reports are replaced

use std::path::PathBuf;

use colored::Colorize;
use tracing::warn;

/// Asked once per run when report files already exist
pub trait OverwritePrompt: Send + Sync {
    /// `true` to go ahead and overwrite `existing` under `report_dir`.
    fn confirm_overwrite(&self, report_dir: &str, existing: &[PathBuf]) -> bool;
}

/// Interactive yes/no on the terminal; defaults to no
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl OverwritePrompt for TerminalPrompt {
    fn confirm_overwrite(&self, report_dir: &str, existing: &[PathBuf]) -> bool {
        eprintln!(
            "{}",
            format!("Report files already exist in {report_dir}:").yellow()
        );
        for path in existing {
            eprintln!("  {}", path.display().to_string().dimmed());
        }

        match dialoguer::Confirm::new()
            .with_prompt("Overwrite them?")
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "overwrite prompt failed, keeping existing reports");
                false
            }
        }
    }
}

/// Answers every prompt with a fixed decision (`--yes` / `--no-overwrite`)
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl OverwritePrompt for FixedAnswer {
    fn confirm_overwrite(&self, _report_dir: &str, _existing: &[PathBuf]) -> bool {
        self.0
    }
}
