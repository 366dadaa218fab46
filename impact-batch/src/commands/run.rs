//! Run command - Execute one task or the whole catalog against the host

use std::path::Path;

use anyhow::Context;
use colored::Colorize;

use crate::catalog::CatalogOptions;
use crate::executor::{BatchRunner, RunOutcome, RunSettings};
use crate::host::{CommandReportGenerator, ProcessHost};
use crate::prompt::{FixedAnswer, OverwritePrompt, TerminalPrompt};
use crate::task_model::TaskModel;
use crate::types::{Task, TaskStatus};

use super::{load_config, remember_source_dir, resolve_source_dir};

/// How existing reports are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteMode {
    Ask,
    Always,
    Never,
}

impl OverwriteMode {
    fn prompt(self) -> Box<dyn OverwritePrompt> {
        match self {
            OverwriteMode::Ask => Box::new(TerminalPrompt),
            OverwriteMode::Always => Box::new(FixedAnswer(true)),
            OverwriteMode::Never => Box::new(FixedAnswer(false)),
        }
    }
}

pub fn run(
    config_path: Option<&Path>,
    source_dir: Option<&Path>,
    task: Option<&str>,
    overwrite: OverwriteMode,
) -> anyhow::Result<()> {
    let (paths, config) = load_config(config_path)?;
    let source_dir = resolve_source_dir(source_dir, &config)?;
    let summary_path = config.resolved_summary_path();

    let settings = RunSettings {
        report_dir: config.resolved_report_dir(),
        base_data_dir: config.resolved_base_data_dir(),
        catalog: CatalogOptions {
            ignore_base_data_dir: config.ignore_base_data_dir,
        },
        summary_path: Some(summary_path.clone()),
    };

    let mut runner = BatchRunner::new(
        TaskModel::default(),
        Box::new(ProcessHost::new(config.host.clone())),
        Box::new(CommandReportGenerator::from_config(&config.host)),
        overwrite.prompt(),
        settings,
    );
    let count = runner.refresh_catalog(&source_dir)?;
    remember_source_dir(&paths, &source_dir);

    if count == 0 {
        eprintln!(
            "{}",
            format!("No scripts or scenarios found in {}", source_dir.display()).yellow()
        );
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new()?;

    match task {
        Some(selector) => {
            let index = select_task(runner.model().tasks(), selector)?;
            let outcome = rt.block_on(runner.run_one(index, true));
            match outcome {
                RunOutcome::Skipped => {
                    println!("{}", "Existing reports kept, task not run.".yellow());
                    Ok(())
                }
                RunOutcome::Finished(status) => {
                    print_task(index, runner.model().get(index));
                    if status == TaskStatus::Fail {
                        anyhow::bail!("task '{}' failed", runner.model().get(index).label);
                    }
                    Ok(())
                }
            }
        }
        None => {
            let Some(summary) = rt.block_on(runner.run_all()) else {
                println!("{}", "Existing reports kept, batch not run.".yellow());
                return Ok(());
            };

            println!();
            for (index, task) in runner.model().tasks().iter().enumerate() {
                print_task(index, task);
            }
            println!(
                "\n{} passed, {} failed, {} total",
                summary.passed().to_string().green(),
                summary.failed().to_string().red(),
                summary.total()
            );
            println!("{} {}", "Summary:".dimmed(), summary_path.display());

            if summary.failed() > 0 {
                anyhow::bail!("{} of {} tasks failed", summary.failed(), summary.total());
            }
            Ok(())
        }
    }
}

/// Find a task by index, or failing that by label.
fn select_task(tasks: &[Task], selector: &str) -> anyhow::Result<usize> {
    if let Ok(index) = selector.parse::<usize>() {
        if index < tasks.len() {
            return Ok(index);
        }
    }
    tasks
        .iter()
        .position(|t| t.label == selector)
        .with_context(|| format!("No task with index or label '{selector}'"))
}

fn print_task(index: usize, task: &Task) {
    let status = match task.status {
        TaskStatus::Success => "PASS".green().bold(),
        TaskStatus::Fail => "FAIL".red().bold(),
        TaskStatus::Running => "RUN ".cyan().bold(),
        TaskStatus::Normal => "----".dimmed(),
    };
    println!("  {:>3}  {}  {}", index, status, task.label);

    if let Some(detail) = &task.error_detail {
        for line in detail.lines() {
            println!("         {}", line.dimmed());
        }
    }
    if let Some(report) = &task.report {
        println!("         {} {}", "map:".dimmed(), report.map.display());
        println!("         {} {}", "table:".dimmed(), report.table.display());
    }
}
