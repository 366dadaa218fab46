//! Options command - Update the persisted batch settings

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::config::loader::{config_exists, read_config, write_config};
use crate::config::paths::resolve_paths;
use crate::types::BatchConfig;

/// Settings given on the command line; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct OptionsUpdate {
    pub source_dir: Option<PathBuf>,
    pub base_data_dir: Option<PathBuf>,
    pub report_dir: Option<String>,
    pub ignore_base_data_dir: Option<bool>,
}

impl OptionsUpdate {
    pub fn is_empty(&self) -> bool {
        self.source_dir.is_none()
            && self.base_data_dir.is_none()
            && self.report_dir.is_none()
            && self.ignore_base_data_dir.is_none()
    }

    /// Apply onto `config`, returning whether anything changed.
    pub fn apply(self, config: &mut BatchConfig) -> bool {
        let before = (
            config.source_dir.clone(),
            config.base_data_dir.clone(),
            config.report_dir.clone(),
            config.ignore_base_data_dir,
        );

        if let Some(dir) = self.source_dir {
            config.source_dir = Some(dir);
        }
        if let Some(dir) = self.base_data_dir {
            config.base_data_dir = Some(dir);
        }
        if let Some(dir) = self.report_dir {
            config.report_dir = Some(dir).filter(|d| !d.trim().is_empty());
        }
        if let Some(flag) = self.ignore_base_data_dir {
            config.ignore_base_data_dir = flag;
        }

        before
            != (
                config.source_dir.clone(),
                config.base_data_dir.clone(),
                config.report_dir.clone(),
                config.ignore_base_data_dir,
            )
    }
}

pub fn run(config_path: Option<&Path>, update: OptionsUpdate) -> anyhow::Result<()> {
    let paths = resolve_paths(config_path);
    let mut config = if config_exists(&paths.config_path) {
        read_config(&paths.config_path)?
    } else {
        BatchConfig::default()
    };

    let update = if update.is_empty() {
        prompt_update(&config)?
    } else {
        update
    };

    if !update.apply(&mut config) {
        println!("{}", "No changes.".dimmed());
        return Ok(());
    }

    write_config(&paths.config_path, &config)?;
    println!(
        "{} {}",
        "✓ Options saved to".green(),
        paths.config_path
    );
    Ok(())
}

fn prompt_update(config: &BatchConfig) -> anyhow::Result<OptionsUpdate> {
    let as_text = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    };

    let base_data_dir: String = dialoguer::Input::new()
        .with_prompt("Base data directory")
        .default(as_text(&config.base_data_dir))
        .allow_empty(true)
        .interact_text()?;

    let report_dir: String = dialoguer::Input::new()
        .with_prompt("Report directory ({date} is replaced with today's date)")
        .default(config.report_dir.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let ignore_base_data_dir = dialoguer::Confirm::new()
        .with_prompt("Resolve scenarios without a 'path' next to their scenario file?")
        .default(config.ignore_base_data_dir)
        .interact()?;

    Ok(OptionsUpdate {
        source_dir: None,
        base_data_dir: Some(base_data_dir)
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from),
        report_dir: Some(report_dir),
        ignore_base_data_dir: Some(ignore_base_data_dir),
    })
}
