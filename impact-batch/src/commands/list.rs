//! List command - Display the task catalog of a source directory

use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;

use crate::catalog::{build_catalog, CatalogOptions};
use crate::types::{Task, TaskKind};

use super::{load_config, remember_source_dir, resolve_source_dir};

#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    index: usize,
    kind: &'static str,
    label: &'a str,
    source: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_root: Option<&'a Path>,
}

impl<'a> ListEntry<'a> {
    fn new(index: usize, task: &'a Task) -> Self {
        let (source, data_root) = match &task.kind {
            TaskKind::Script { source_path } => (source_path.as_path(), None),
            TaskKind::Scenario(s) => (s.source_file.as_path(), Some(s.data_root.as_path())),
        };
        Self {
            index,
            kind: task.kind_name(),
            label: &task.label,
            source,
            data_root,
        }
    }
}

pub fn run(
    config_path: Option<&Path>,
    source_dir: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let (paths, config) = load_config(config_path)?;
    let source_dir: PathBuf = resolve_source_dir(source_dir, &config)?;

    let options = CatalogOptions {
        ignore_base_data_dir: config.ignore_base_data_dir,
    };
    let tasks = build_catalog(&source_dir, &config.resolved_base_data_dir(), options)?;
    remember_source_dir(&paths, &source_dir);

    let entries: Vec<ListEntry<'_>> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| ListEntry::new(i, task))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        eprintln!(
            "{}",
            format!("No scripts or scenarios found in {}", source_dir.display()).yellow()
        );
        return Ok(());
    }

    println!(
        "{}",
        format!("\n{} task(s) in {}\n", entries.len(), source_dir.display()).bold()
    );
    for entry in &entries {
        let kind = match entry.kind {
            "script" => entry.kind.cyan(),
            _ => entry.kind.magenta(),
        };
        let root = entry
            .data_root
            .map(|r| format!("  {}", r.display()).dimmed().to_string())
            .unwrap_or_default();
        println!("  {:>3}  {:<9} {}{}", entry.index, kind, entry.label.bold(), root);
    }
    println!();

    Ok(())
}
