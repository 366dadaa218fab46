use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a task in the batch list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Normal,
    Running,
    Success,
    Fail,
}

impl TaskStatus {
    /// Whether the task finished (successfully or not) on its last attempt.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Fail)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Normal => write!(f, "normal"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Success => write!(f, "success"),
            TaskStatus::Fail => write!(f, "fail"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(TaskStatus::Normal),
            "running" => Ok(TaskStatus::Running),
            "success" => Ok(TaskStatus::Success),
            "fail" | "failed" => Ok(TaskStatus::Fail),
            _ => Err(format!(
                "Unknown task status: '{s}'. Expected: normal, running, success, fail"
            )),
        }
    }
}

/// Geospatial layer flavour, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Raster,
    Vector,
}

impl LayerKind {
    /// Classify a layer file by its extension (`asc`/`tif` raster, `shp` vector).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "asc" | "tif" => Some(LayerKind::Raster),
            "shp" => Some(LayerKind::Vector),
            _ => None,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Raster => write!(f, "raster"),
            LayerKind::Vector => write!(f, "vector"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_default_is_normal() {
        assert_eq!(TaskStatus::default(), TaskStatus::Normal);
    }

    #[test]
    fn test_task_status_from_str() {
        assert_eq!("normal".parse::<TaskStatus>().unwrap(), TaskStatus::Normal);
        assert_eq!("RUNNING".parse::<TaskStatus>().unwrap(), TaskStatus::Running);
        assert_eq!("failed".parse::<TaskStatus>().unwrap(), TaskStatus::Fail);
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_status_serde_roundtrip() {
        let statuses = [
            (TaskStatus::Normal, "\"normal\""),
            (TaskStatus::Running, "\"running\""),
            (TaskStatus::Success, "\"success\""),
            (TaskStatus::Fail, "\"fail\""),
        ];

        for (status, expected_json) in statuses {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, expected_json);
            let deserialized: TaskStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(deserialized, status);
        }
    }

    #[test]
    fn test_task_status_is_terminal() {
        assert!(TaskStatus::Success.is_terminal());
        assert!(TaskStatus::Fail.is_terminal());
        assert!(!TaskStatus::Normal.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
    }

    #[test]
    fn test_layer_kind_from_extension() {
        assert_eq!(LayerKind::from_extension("tif"), Some(LayerKind::Raster));
        assert_eq!(LayerKind::from_extension("asc"), Some(LayerKind::Raster));
        assert_eq!(LayerKind::from_extension("SHP"), Some(LayerKind::Vector));
        assert_eq!(LayerKind::from_extension("csv"), None);
    }
}
