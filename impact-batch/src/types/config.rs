use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings for the process-backed host and report renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_script_interpreter")]
    pub script_interpreter: String,
    /// argv template; placeholders `{hazard}`, `{exposure}`, `{aggregation}`,
    /// `{function}`, `{extent}`, `{output}`
    #[serde(default)]
    pub analysis_command: Option<Vec<String>>,
    /// argv template; placeholders `{layer}`, `{output}`
    #[serde(default)]
    pub map_report_command: Option<Vec<String>>,
    #[serde(default)]
    pub table_report_command: Option<Vec<String>>,
    /// Scratch directory for analysis outputs
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
    /// Impact function ids the host knows about; empty accepts any id
    #[serde(default)]
    pub functions: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            script_interpreter: default_script_interpreter(),
            analysis_command: None,
            map_report_command: None,
            table_report_command: None,
            work_dir: None,
            functions: Vec::new(),
        }
    }
}

impl HostConfig {
    pub fn resolved_work_dir(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("impact-batch"))
    }
}

/// Persisted batch runner settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Last directory scripts and scenarios were loaded from
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
    /// Default root for relative layer paths in scenario files
    #[serde(default)]
    pub base_data_dir: Option<PathBuf>,
    /// Output directory for PDF reports; may contain `{date}`
    #[serde(default)]
    pub report_dir: Option<String>,
    /// Resolve scenarios without a `path` key next to their scenario file
    #[serde(default)]
    pub ignore_base_data_dir: bool,
    #[serde(default)]
    pub summary_path: Option<PathBuf>,
    #[serde(default)]
    pub host: HostConfig,
}

impl BatchConfig {
    /// Report directory, falling back to the base data directory.
    pub fn resolved_report_dir(&self) -> String {
        self.report_dir.clone().unwrap_or_else(|| {
            self.base_data_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| ".".to_string())
        })
    }

    /// Base data directory as an absolute path; relative values resolve against the
    /// working directory and an unset value means the working directory itself.
    pub fn resolved_base_data_dir(&self) -> PathBuf {
        let dir = self
            .base_data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        if dir.is_absolute() {
            return dir;
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(&dir))
            .unwrap_or(dir)
    }

    pub fn resolved_summary_path(&self) -> PathBuf {
        self.summary_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("batch-report.txt"))
    }
}

/// Path configuration for local vs global config resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathConfig {
    #[serde(rename = "type")]
    pub config_type: PathConfigType,
    pub config_path: String,
}

/// Whether config was found locally or globally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathConfigType {
    Local,
    Global,
    Explicit,
}

fn default_script_interpreter() -> String {
    "python3".to_string()
}
