use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::enums::TaskStatus;

/// A task-local validation failure, detected before the host is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("scenario is missing required key '{0}'")]
    MissingKey(&'static str),
    #[error("extent needs exactly 4 values but got {0} instead")]
    ExtentCount(usize),
    #[error("invalid extent coordinate '{0}'")]
    ExtentValue(String),
}

/// Map bounding box `minx,miny,maxx,maxy`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl FromStr for Extent {
    type Err = ValidationError;

    /// Accepts comma separated values with optional spaces: `"110.1, -7.8,110.6,-7.5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let parts: Vec<&str> = compact.split(',').collect();
        if parts.len() != 4 {
            return Err(ValidationError::ExtentCount(parts.len()));
        }

        let mut coords = [0.0_f64; 4];
        for (slot, part) in coords.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .map_err(|_| ValidationError::ExtentValue((*part).to_string()))?;
        }

        Ok(Extent {
            min_x: coords[0],
            min_y: coords[1],
            max_x: coords[2],
            max_y: coords[3],
        })
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Map and table PDF paths produced for one scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPaths {
    pub map: PathBuf,
    pub table: PathBuf,
}

/// Declarative hazard/exposure/aggregation/function combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTask {
    /// Base directory that relative layer paths are resolved against
    pub data_root: PathBuf,
    /// Scenario file the section was read from
    pub source_file: PathBuf,
    pub hazard: Option<String>,
    pub exposure: Option<String>,
    pub aggregation: Option<String>,
    pub impact_function_id: Option<String>,
    /// Raw extent string, parsed at run time
    pub extent: Option<String>,
    /// Keys the runner does not interpret, kept verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ScenarioTask {
    /// Ordered layer list: hazard, exposure, then the optional aggregation layer.
    pub fn layers(&self) -> Result<Vec<String>, ValidationError> {
        let hazard = self
            .hazard
            .as_ref()
            .ok_or(ValidationError::MissingKey("hazard"))?;
        let exposure = self
            .exposure
            .as_ref()
            .ok_or(ValidationError::MissingKey("exposure"))?;

        let mut layers = vec![hazard.clone(), exposure.clone()];
        if let Some(aggregation) = &self.aggregation {
            layers.push(aggregation.clone());
        }
        Ok(layers)
    }

    /// Parsed extent, `None` when the scenario does not restrict it.
    pub fn parsed_extent(&self) -> Result<Option<Extent>, ValidationError> {
        self.extent.as_deref().map(str::parse).transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TaskKind {
    /// Automation unit executed by the host
    Script { source_path: PathBuf },
    Scenario(ScenarioTask),
}

/// One runnable unit in the batch list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub label: String,
    pub status: TaskStatus,
    #[serde(flatten)]
    pub kind: TaskKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportPaths>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl Task {
    pub fn script(label: impl Into<String>, source_path: impl AsRef<Path>) -> Self {
        Self::new(
            label,
            TaskKind::Script {
                source_path: source_path.as_ref().to_path_buf(),
            },
        )
    }

    pub fn scenario(label: impl Into<String>, scenario: ScenarioTask) -> Self {
        Self::new(label, TaskKind::Scenario(scenario))
    }

    fn new(label: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            label: label.into(),
            status: TaskStatus::Normal,
            kind,
            report: None,
            error_detail: None,
        }
    }

    pub fn is_scenario(&self) -> bool {
        matches!(self.kind, TaskKind::Scenario(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            TaskKind::Script { .. } => "script",
            TaskKind::Scenario(_) => "scenario",
        }
    }
}
