//! Plain-text pass/fail summary written after a batch run

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

const BANNER: &str = " InaSAFE Batch Report File";

fn rule() -> String {
    "-".repeat(29)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub label: String,
    pub passed: bool,
}

/// Outcome of a full batch run, one entry per task in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub entries: Vec<SummaryEntry>,
}

impl BatchSummary {
    pub fn push(&mut self, label: impl Into<String>, passed: bool) {
        self.entries.push(SummaryEntry {
            label: label.into(),
            passed,
        });
    }

    pub fn passed(&self) -> usize {
        self.entries.iter().filter(|e| e.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(BANNER);
        out.push('\n');
        out.push_str(&rule());
        out.push('\n');
        for entry in &self.entries {
            let mark = if entry.passed { "P" } else { "F" };
            out.push_str(&format!("{mark}: {}\n", entry.label));
        }
        out.push_str(&rule());
        out.push('\n');
        out.push_str(&format!("Total passed: {}\n", self.passed()));
        out.push_str(&format!("Total failed: {}\n", self.failed()));
        out.push_str(&format!("Total tasks: {}\n", self.total()));
        out.push_str(&rule());
        out.push('\n');
        out
    }

    /// Write the rendered summary, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, self.render())
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        info!(path = %path.display(), "summary written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> BatchSummary {
        let mut summary = BatchSummary::default();
        summary.push("basic.py", true);
        summary.push("merapi", false);
        summary.push("jakarta flood", true);
        summary
    }

    #[test]
    fn test_counts() {
        let summary = sample();
        assert_eq!(summary.passed(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_render_format() {
        let expected = " InaSAFE Batch Report File\n\
-----------------------------
P: basic.py
F: merapi
P: jakarta flood
-----------------------------
Total passed: 2
Total failed: 1
Total tasks: 3
-----------------------------
";
        assert_eq!(sample().render(), expected);
    }

    #[test]
    fn test_banner_keeps_leading_space() {
        let rendered = sample().render();
        assert_eq!(rendered.lines().next(), Some(" InaSAFE Batch Report File"));
    }

    #[test]
    fn test_empty_summary() {
        let rendered = BatchSummary::default().render();
        assert!(rendered.contains("Total tasks: 0"));
    }

    #[test]
    fn test_write_to_creates_parent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/batch-report.txt");
        sample().write_to(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), sample().render());
    }
}
