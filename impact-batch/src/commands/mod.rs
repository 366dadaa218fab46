pub mod config;
pub mod list;
pub mod options;
pub mod run;
pub mod save_scenario;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::config::loader::{apply_env_overrides, config_exists, read_config_with_env, write_config};
use crate::config::paths::resolve_paths;
use crate::config::validate_config;
use crate::types::{BatchConfig, PathConfig};

/// Resolve the config location and load it; a missing file means defaults plus env overrides.
pub fn load_config(explicit: Option<&Path>) -> Result<(PathConfig, BatchConfig)> {
    let paths = resolve_paths(explicit);

    let config = if config_exists(&paths.config_path) {
        read_config_with_env(&paths.config_path)
            .with_context(|| format!("Failed to load config from {}", paths.config_path))?
    } else {
        debug!(path = %paths.config_path, "no config file, using defaults");
        let mut config = BatchConfig::default();
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        config
    };

    validate_config(&config)?;
    Ok((paths, config))
}

/// Pick the source directory: the argument wins over the remembered one.
pub fn resolve_source_dir(arg: Option<&Path>, config: &BatchConfig) -> Result<PathBuf> {
    arg.map(Path::to_path_buf)
        .or_else(|| config.source_dir.clone())
        .context("No source directory given and none remembered in config")
}

/// Remember `source_dir` as the last one used, if it changed.
pub fn remember_source_dir(paths: &PathConfig, source_dir: &Path) {
    // Re-read without env overrides so they never get persisted
    let mut stored = if config_exists(&paths.config_path) {
        match crate::config::read_config(&paths.config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "not remembering source directory");
                return;
            }
        }
    } else {
        BatchConfig::default()
    };

    let source_dir = source_dir
        .canonicalize()
        .unwrap_or_else(|_| source_dir.to_path_buf());
    if stored.source_dir.as_deref() == Some(source_dir.as_path()) {
        return;
    }

    stored.source_dir = Some(source_dir);
    if let Err(e) = write_config(&paths.config_path, &stored) {
        warn!(error = %e, path = %paths.config_path, "could not save source directory");
    }
}
