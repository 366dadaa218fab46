//! Save-scenario command - Capture a hazard/exposure/function combination as a scenario file

use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;

use crate::scenario::{write_scenario, SavedScenario};

pub fn run(
    hazard: &Path,
    exposure: &Path,
    function: &str,
    title: Option<&str>,
    out: &Path,
) -> anyhow::Result<()> {
    let hazard = absolute(hazard)?;
    let exposure = absolute(exposure)?;

    let scenario = SavedScenario::from_layers(title, &hazard, &exposure, function)?;
    write_scenario(out, &scenario)?;

    println!(
        "{} [{}] {} {}",
        "✓ Saved scenario".green(),
        scenario.title.bold(),
        "to".green(),
        out.display()
    );
    println!("  {} {}", "path:".dimmed(), scenario.root.display());
    Ok(())
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}
