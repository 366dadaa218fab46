//! Config command - Show or edit current configuration

use colored::Colorize;
use std::path::Path;
use std::process::Command;

use crate::config::loader::{read_config, ENV_OVERRIDES};
use crate::config::paths::resolve_paths;
use crate::types::BatchConfig;

pub fn run(config_path: Option<&Path>, edit: bool) -> anyhow::Result<()> {
    let paths = resolve_paths(config_path);

    if edit {
        return edit_config(&paths.config_path);
    }

    println!("{}", "\nImpact Batch Configuration\n".bold());

    println!("{}", "Config location:".dimmed());
    let config = if Path::new(&paths.config_path).exists() {
        println!(
            "  {} {} ({:?})",
            "●".green(),
            paths.config_path,
            paths.config_type
        );
        match read_config(&paths.config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("\n{}", "Error reading config:".red());
                eprintln!("  {}", format!("{}", e).dimmed());
                println!();
                return Ok(());
            }
        }
    } else {
        println!(
            "  {} {} (not found, using defaults)",
            "○".red(),
            paths.config_path
        );
        println!(
            "  {}",
            "Run 'impact-batch options' to create it.".dimmed()
        );
        BatchConfig::default()
    };

    print_settings(&config);

    println!("{}", "\nEnvironment overrides:".dimmed());
    let mut has_overrides = false;
    for var in ENV_OVERRIDES {
        if let Ok(val) = std::env::var(var) {
            println!("  {}={}", var, val.yellow());
            has_overrides = true;
        }
    }
    if !has_overrides {
        println!("  {}", "(none)".dimmed());
    }
    println!();

    Ok(())
}

fn print_settings(config: &BatchConfig) {
    let unset = || "(unset)".dimmed().to_string();
    let path_or_unset = |p: &Option<std::path::PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string().cyan().to_string())
            .unwrap_or_else(unset)
    };
    let argv_or_unset = |argv: &Option<Vec<String>>| {
        argv.as_ref()
            .map(|a| a.join(" ").cyan().to_string())
            .unwrap_or_else(unset)
    };

    println!("{}", "\nCurrent settings:".dimmed());
    println!("  source_dir:            {}", path_or_unset(&config.source_dir));
    println!("  base_data_dir:         {}", path_or_unset(&config.base_data_dir));
    println!(
        "  report_dir:            {}",
        config.resolved_report_dir().cyan()
    );
    println!(
        "  ignore_base_data_dir:  {}",
        config.ignore_base_data_dir.to_string().cyan()
    );
    println!(
        "  summary_path:          {}",
        config.resolved_summary_path().display().to_string().cyan()
    );

    println!("{}", "\nHost:".dimmed());
    println!(
        "  script_interpreter:    {}",
        config.host.script_interpreter.cyan()
    );
    println!(
        "  analysis_command:      {}",
        argv_or_unset(&config.host.analysis_command)
    );
    println!(
        "  map_report_command:    {}",
        argv_or_unset(&config.host.map_report_command)
    );
    println!(
        "  table_report_command:  {}",
        argv_or_unset(&config.host.table_report_command)
    );
    println!(
        "  work_dir:              {}",
        config.host.resolved_work_dir().display().to_string().cyan()
    );
    if !config.host.functions.is_empty() {
        println!(
            "  functions:             {}",
            config.host.functions.join(", ").cyan()
        );
    }
}

fn edit_config(config_path: &str) -> anyhow::Result<()> {
    if !Path::new(config_path).exists() {
        anyhow::bail!(
            "Config not found at {}. Run 'impact-batch options' to create it.",
            config_path
        );
    }

    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());

    println!(
        "{}",
        format!("Opening {} in {}...\n", config_path, editor).dimmed()
    );

    match Command::new(&editor).arg(config_path).status() {
        Ok(s) if s.success() => Ok(()),
        Ok(_) => anyhow::bail!("Editor {} exited with error", editor),
        Err(_) => anyhow::bail!(
            "Failed to open editor {}. Set EDITOR or VISUAL to your preferred editor.",
            editor
        ),
    }
}
