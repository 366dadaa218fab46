//! Task catalog - turns a source directory into the ordered batch task list

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::scenario::{read_scenarios_ordered, ScenarioRecord};
use crate::types::{ScenarioTask, Task};

/// Extension of automation scripts
pub const SCRIPT_EXTENSION: &str = "py";

/// Extension of scenario files
pub const SCENARIO_EXTENSION: &str = "txt";

#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogOptions {
    /// Resolve scenarios without a `path` key against their own file's directory
    pub ignore_base_data_dir: bool,
}

/// Scan `source_dir` (non-recursively) and build the task list.
///
/// Entries are visited in file-name order so the list is stable for an
/// unchanged directory. Each `.py` file becomes a script task and each
/// section of each `.txt` file becomes a scenario task.
pub fn build_catalog(
    source_dir: &Path,
    default_data_root: &Path,
    options: CatalogOptions,
) -> Result<Vec<Task>> {
    let entries = fs::read_dir(source_dir)
        .with_context(|| format!("Failed to read source directory {}", source_dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect();
    files.sort();

    let mut tasks = Vec::new();
    for file in files {
        let Some(ext) = file.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let abs = absolute(&file);

        if ext == SCRIPT_EXTENSION {
            let label = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            debug!(label = %label, "catalog: script");
            tasks.push(Task::script(label, abs));
        } else if ext == SCENARIO_EXTENSION {
            let fallback_root = if options.ignore_base_data_dir {
                abs.parent().map(Path::to_path_buf).unwrap_or_default()
            } else {
                absolute(default_data_root)
            };

            for (name, record) in read_scenarios_ordered(&abs) {
                debug!(label = %name, file = %abs.display(), "catalog: scenario");
                tasks.push(Task::scenario(
                    name,
                    scenario_from_record(record, &abs, &fallback_root),
                ));
            }
        }
    }

    info!(
        source_dir = %source_dir.display(),
        tasks = tasks.len(),
        "catalog populated"
    );
    Ok(tasks)
}

/// Map a parsed section onto a scenario task; `fallback_root` applies when `path` is absent.
/// A relative `path` resolves against the directory of `source_file`.
pub fn scenario_from_record(
    mut record: ScenarioRecord,
    source_file: &Path,
    fallback_root: &Path,
) -> ScenarioTask {
    let mut take = |key: &str| record.remove(key).filter(|v| !v.is_empty());

    let data_root = match take("path").map(PathBuf::from) {
        Some(root) if root.is_absolute() => root,
        Some(root) => source_file
            .parent()
            .map(|dir| dir.join(&root))
            .unwrap_or(root),
        None => fallback_root.to_path_buf(),
    };
    let hazard = take("hazard");
    let exposure = take("exposure");
    let aggregation = take("aggregation");
    let impact_function_id = take("function");
    let extent = take("extent");

    ScenarioTask {
        data_root,
        source_file: source_file.to_path_buf(),
        hazard,
        exposure,
        aggregation,
        impact_function_id,
        extent,
        extra: record,
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
