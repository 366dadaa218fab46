pub mod catalog;
pub mod commands;
pub mod config;
pub mod executor;
pub mod host;
pub mod prompt;
pub mod report_paths;
pub mod scenario;
pub mod summary;
pub mod task_model;
pub mod types;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::commands::options::OptionsUpdate;
use crate::commands::run::OverwriteMode;

#[derive(Parser)]
#[command(
    name = "impact-batch",
    version,
    about = "Batch runner for hazard impact scenarios",
    long_about = "Runs automation scripts and hazard/exposure impact scenarios one at a time against a host, producing map and table PDF reports and a pass/fail summary."
)]
struct Cli {
    /// Config file (overrides local and global discovery)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the scripts and scenarios found in a source directory
    List {
        /// Directory to scan (defaults to the last one used)
        source_dir: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one task or every task in a source directory
    Run {
        /// Directory to scan (defaults to the last one used)
        source_dir: Option<PathBuf>,

        /// Run only this task (index or label)
        #[arg(short, long, value_name = "INDEX|LABEL")]
        task: Option<String>,

        /// Overwrite existing reports without asking
        #[arg(short, long, conflicts_with = "no_overwrite")]
        yes: bool,

        /// Never overwrite existing reports
        #[arg(long)]
        no_overwrite: bool,
    },

    /// Show current configuration
    Config {
        /// Open config in $EDITOR
        #[arg(short, long)]
        edit: bool,
    },

    /// Update persisted options (prompts when no flag is given)
    Options {
        #[arg(long)]
        source_dir: Option<PathBuf>,

        #[arg(long)]
        base_data_dir: Option<PathBuf>,

        /// May contain {date}
        #[arg(long)]
        report_dir: Option<String>,

        #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
        ignore_base_data_dir: Option<bool>,
    },

    /// Write a scenario file from a hazard and exposure layer
    SaveScenario {
        #[arg(long)]
        hazard: PathBuf,

        #[arg(long)]
        exposure: PathBuf,

        /// Impact function id
        #[arg(long)]
        function: String,

        /// Section title (defaults to the hazard file name)
        #[arg(long)]
        title: Option<String>,

        /// Scenario file to write
        out: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "impact_batch=debug"
    } else {
        "impact_batch=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();

    match cli.command {
        Command::List { source_dir, json } => {
            if let Err(e) = commands::list::run(config, source_dir.as_deref(), json) {
                eprintln!("List error: {:#}", e);
                std::process::exit(1);
            }
        }
        Command::Run {
            source_dir,
            task,
            yes,
            no_overwrite,
        } => {
            let overwrite = if yes {
                OverwriteMode::Always
            } else if no_overwrite {
                OverwriteMode::Never
            } else {
                OverwriteMode::Ask
            };
            if let Err(e) =
                commands::run::run(config, source_dir.as_deref(), task.as_deref(), overwrite)
            {
                eprintln!("Run error: {:#}", e);
                std::process::exit(1);
            }
        }
        Command::Config { edit } => {
            if let Err(e) = commands::config::run(config, edit) {
                eprintln!("Config error: {:#}", e);
                std::process::exit(1);
            }
        }
        Command::Options {
            source_dir,
            base_data_dir,
            report_dir,
            ignore_base_data_dir,
        } => {
            let update = OptionsUpdate {
                source_dir,
                base_data_dir,
                report_dir,
                ignore_base_data_dir,
            };
            if let Err(e) = commands::options::run(config, update) {
                eprintln!("Options error: {:#}", e);
                std::process::exit(1);
            }
        }
        Command::SaveScenario {
            hazard,
            exposure,
            function,
            title,
            out,
        } => {
            if let Err(e) =
                commands::save_scenario::run(&hazard, &exposure, &function, title.as_deref(), &out)
            {
                eprintln!("Save scenario error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::parse_from([
            "impact-batch",
            "run",
            "/scenarios",
            "--task",
            "merapi",
            "--yes",
        ]);
        match cli.command {
            Command::Run {
                source_dir,
                task,
                yes,
                no_overwrite,
            } => {
                assert_eq!(source_dir, Some(PathBuf::from("/scenarios")));
                assert_eq!(task.as_deref(), Some("merapi"));
                assert!(yes);
                assert!(!no_overwrite);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_yes_conflicts_with_no_overwrite() {
        assert!(Cli::try_parse_from(["impact-batch", "run", "--yes", "--no-overwrite"]).is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["impact-batch", "list", "--config", "/tmp/c.yaml", "-v"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert!(cli.verbose);
    }
}
