use std::env;
use std::path::{Path, PathBuf};

use crate::types::{PathConfig, PathConfigType};

/// File name of a project-local config
pub const LOCAL_CONFIG_NAME: &str = "impact-batch.yaml";

/// Get the global config directory (~/.config/impact-batch or $XDG_CONFIG_HOME/impact-batch)
pub fn get_global_config_dir() -> PathBuf {
    let base = if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config")
    } else {
        PathBuf::from(".config")
    };
    base.join("impact-batch")
}

/// Walk up from start_dir looking for impact-batch.yaml
pub fn find_local_config(start_dir: Option<&Path>) -> Option<PathBuf> {
    let start = match start_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir().ok()?,
    };

    let mut dir = start.as_path();

    loop {
        let config_path = dir.join(LOCAL_CONFIG_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        match dir.parent() {
            Some(parent) if parent != dir => dir = parent,
            _ => break,
        }
    }

    None
}

/// Resolve the config path.
/// Priority: explicit path > local config (walk up tree) > global config
pub fn resolve_paths(explicit: Option<&Path>) -> PathConfig {
    if let Some(path) = explicit {
        return PathConfig {
            config_type: PathConfigType::Explicit,
            config_path: path.to_string_lossy().to_string(),
        };
    }

    if let Some(local_config) = find_local_config(None) {
        return PathConfig {
            config_type: PathConfigType::Local,
            config_path: local_config.to_string_lossy().to_string(),
        };
    }

    get_paths_for_type(PathConfigType::Global, None)
}

/// Get paths for a specific config type, rooted at `project_dir` for local configs.
pub fn get_paths_for_type(config_type: PathConfigType, project_dir: Option<&Path>) -> PathConfig {
    match config_type {
        PathConfigType::Local | PathConfigType::Explicit => {
            let root = project_dir
                .map(Path::to_path_buf)
                .or_else(|| env::current_dir().ok())
                .unwrap_or_else(|| PathBuf::from("."));
            PathConfig {
                config_type,
                config_path: root.join(LOCAL_CONFIG_NAME).to_string_lossy().to_string(),
            }
        }
        PathConfigType::Global => PathConfig {
            config_type: PathConfigType::Global,
            config_path: get_global_config_dir()
                .join("config.yaml")
                .to_string_lossy()
                .to_string(),
        },
    }
}
