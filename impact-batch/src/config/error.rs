use std::fmt;

/// Errors that can occur during configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found at expected path
    NotFound(String),
    /// Failed to parse config file (YAML syntax error)
    ParseError(String),
    /// IO error reading/writing config
    IoError(std::io::Error),
    /// Config validation failed
    ValidationError(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {msg}"),
            ConfigError::IoError(err) => write!(f, "Config IO error: {err}"),
            ConfigError::ValidationError(errors) => {
                writeln!(f, "Config validation failed:")?;
                for err in errors {
                    writeln!(f, "  - {err}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
