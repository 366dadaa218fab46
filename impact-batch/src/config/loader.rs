use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use crate::types::BatchConfig;

const ENV_SOURCE_DIR: &str = "IMPACT_BATCH_SOURCE_DIR";
const ENV_BASE_DATA_DIR: &str = "IMPACT_BATCH_BASE_DATA_DIR";
const ENV_REPORT_DIR: &str = "IMPACT_BATCH_REPORT_DIR";

/// Names of the environment variables that override file settings
pub const ENV_OVERRIDES: [&str; 3] = [ENV_SOURCE_DIR, ENV_BASE_DATA_DIR, ENV_REPORT_DIR];

pub fn config_exists(config_path: &str) -> bool {
    Path::new(config_path).exists()
}

/// Read and parse a YAML config file.
pub fn read_config(config_path: &str) -> Result<BatchConfig, ConfigError> {
    if !config_exists(config_path) {
        return Err(ConfigError::NotFound(config_path.to_string()));
    }
    let content = fs::read_to_string(config_path)?;
    if content.trim().is_empty() {
        return Ok(BatchConfig::default());
    }
    let config: BatchConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Read the config file, then apply `IMPACT_BATCH_*` environment overrides.
pub fn read_config_with_env(config_path: &str) -> Result<BatchConfig, ConfigError> {
    let mut config = read_config(config_path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Apply overrides from `lookup` (an env-like key/value source).
pub fn apply_env_overrides<F>(config: &mut BatchConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(ENV_SOURCE_DIR).filter(|v| !v.is_empty()) {
        config.source_dir = Some(PathBuf::from(dir));
    }
    if let Some(dir) = lookup(ENV_BASE_DATA_DIR).filter(|v| !v.is_empty()) {
        config.base_data_dir = Some(PathBuf::from(dir));
    }
    if let Some(dir) = lookup(ENV_REPORT_DIR).filter(|v| !v.is_empty()) {
        config.report_dir = Some(dir);
    }
}

/// Check the config for problems, reporting all of them at once.
pub fn validate_config(config: &BatchConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.host.script_interpreter.trim().is_empty() {
        errors.push("host.script_interpreter must not be empty".to_string());
    }

    let templates = [
        ("host.analysis_command", &config.host.analysis_command),
        ("host.map_report_command", &config.host.map_report_command),
        ("host.table_report_command", &config.host.table_report_command),
    ];
    for (name, template) in templates {
        if let Some(argv) = template {
            if argv.first().map_or(true, |program| program.trim().is_empty()) {
                errors.push(format!("{name} must start with a program name"));
            }
        }
    }

    if let Some(report_dir) = &config.report_dir {
        if report_dir.trim().is_empty() {
            errors.push("report_dir must not be empty when set".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors))
    }
}

/// Write the config atomically (temp file + rename).
pub fn write_config(config_path: &str, config: &BatchConfig) -> Result<(), ConfigError> {
    let path = Path::new(config_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let yaml = serde_yaml::to_string(config)?;
    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
