//! Layer path resolution shared by host implementations

use std::path::{Path, PathBuf};

use crate::types::LayerKind;

use super::{HostError, LayerHandle};

/// A layer file resolved against its data root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSpec {
    /// Path as written in the scenario
    pub relative: String,
    pub path: PathBuf,
    /// File stem, used as the layer name
    pub name: String,
    pub kind: LayerKind,
}

impl LayerSpec {
    pub fn handle(&self) -> LayerHandle {
        LayerHandle {
            name: self.name.clone(),
            source: self.path.clone(),
            kind: Some(self.kind),
        }
    }
}

/// Resolve each relative path under `root`, classifying it by extension.
///
/// `.asc`/`.tif` load as raster and `.shp` as vector; any other extension
/// or a missing file fails the whole load.
pub fn resolve_layers(root: &Path, relative_paths: &[String]) -> Result<Vec<LayerSpec>, HostError> {
    relative_paths
        .iter()
        .map(|relative| resolve_layer(root, relative))
        .collect()
}

fn resolve_layer(root: &Path, relative: &str) -> Result<LayerSpec, HostError> {
    let path = root.join(relative);
    let kind = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(LayerKind::from_extension)
        .ok_or_else(|| {
            HostError::Load(format!("File {} had illegal extension", path.display()))
        })?;

    if !path.is_file() {
        return Err(HostError::Load(format!(
            "Layer {} does not exist",
            path.display()
        )));
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(LayerSpec {
        relative: relative.to_string(),
        path,
        name,
        kind,
    })
}
