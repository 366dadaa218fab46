//! Host session backed by external processes
//!
//! Scripts run through the configured interpreter. Analyses run the
//! configured argv template with layer placeholders substituted; nothing is
//! passed through a shell.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::types::{Extent, HostConfig, LayerKind};

use super::layers::{resolve_layers, LayerSpec};
use super::{AnalysisHandle, HostError, HostSession, LayerHandle};

/// Lines of stderr kept in error messages
const STDERR_TAIL_LINES: usize = 5;

pub struct ProcessHost {
    config: HostConfig,
    loaded: Vec<LayerSpec>,
    function: Option<String>,
    aggregation: Option<LayerSpec>,
    extent: Option<Extent>,
    result: Arc<Mutex<Option<LayerHandle>>>,
    runs: u64,
}

impl ProcessHost {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            loaded: Vec::new(),
            function: None,
            aggregation: None,
            extent: None,
            result: Arc::new(Mutex::new(None)),
            runs: 0,
        }
    }

    /// Layers loaded in the current session, in load order.
    pub fn loaded_layers(&self) -> &[LayerSpec] {
        &self.loaded
    }

    fn set_result(&self, layer: Option<LayerHandle>) {
        if let Ok(mut slot) = self.result.lock() {
            *slot = layer;
        }
    }

    fn analysis_argv(&self, output: &Path) -> Result<Vec<String>, HostError> {
        let template = self
            .config
            .analysis_command
            .as_ref()
            .ok_or(HostError::NotConfigured("analysis_command"))?;

        let (hazard, exposure) = match self.loaded.as_slice() {
            [hazard, exposure, ..] => (hazard, exposure),
            _ => {
                return Err(HostError::Analysis(
                    "hazard and exposure layers must be loaded first".to_string(),
                ))
            }
        };

        let hazard = hazard.path.to_string_lossy().to_string();
        let exposure = exposure.path.to_string_lossy().to_string();
        let aggregation = self
            .aggregation
            .as_ref()
            .map(|a| a.path.to_string_lossy().to_string())
            .unwrap_or_default();
        let function = self.function.clone().unwrap_or_default();
        let extent = self.extent.map(|e| e.to_string()).unwrap_or_default();
        let output = output.to_string_lossy().to_string();

        Ok(expand_template(
            template,
            &[
                ("hazard", hazard.as_str()),
                ("exposure", exposure.as_str()),
                ("aggregation", aggregation.as_str()),
                ("function", function.as_str()),
                ("extent", extent.as_str()),
                ("output", output.as_str()),
            ],
        ))
    }
}

#[async_trait]
impl HostSession for ProcessHost {
    async fn new_session(&mut self) -> Result<(), HostError> {
        self.loaded.clear();
        self.function = None;
        self.aggregation = None;
        self.extent = None;
        self.set_result(None);
        debug!("host session reset");
        Ok(())
    }

    async fn run_script(&mut self, source: &Path) -> Result<(), HostError> {
        let argv = vec![
            self.config.script_interpreter.clone(),
            source.to_string_lossy().to_string(),
        ];
        let cwd = source.parent().map(Path::to_path_buf);

        info!(script = %source.display(), "running script");
        let output = run_argv("script_interpreter", &argv, cwd.as_deref()).await?;
        if !output.status.success() {
            return Err(HostError::Script {
                path: source.to_path_buf(),
                message: failure_message(&output),
            });
        }
        Ok(())
    }

    async fn load_layers(
        &mut self,
        root: &Path,
        relative_paths: &[String],
    ) -> Result<(), HostError> {
        let specs = resolve_layers(root, relative_paths)?;
        for spec in &specs {
            debug!(layer = %spec.name, kind = %spec.kind, "layer loaded");
        }
        self.loaded.extend(specs);
        Ok(())
    }

    async fn select_impact_function(&mut self, id: &str) -> bool {
        let known =
            self.config.functions.is_empty() || self.config.functions.iter().any(|f| f == id);
        if known {
            self.function = Some(id.to_string());
        }
        known
    }

    async fn select_aggregation_layer(&mut self, path: &str) -> bool {
        match self.loaded.iter().find(|l| l.relative == path) {
            Some(layer) => {
                self.aggregation = Some(layer.clone());
                true
            }
            None => false,
        }
    }

    async fn set_map_extent(&mut self, extent: Extent) {
        self.extent = Some(extent);
    }

    fn run_analysis(&mut self, cancel: CancellationToken) -> Result<AnalysisHandle, HostError> {
        let work_dir = self.config.resolved_work_dir();
        std::fs::create_dir_all(&work_dir)?;

        self.runs += 1;
        let output = work_dir.join(format!("impact_{}.shp", self.runs));
        let argv = self.analysis_argv(&output)?;
        self.set_result(None);

        let (tx, handle) = AnalysisHandle::channel();
        let slot = Arc::clone(&self.result);
        info!(output = %output.display(), "analysis started");

        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => Err(HostError::Cancelled),
                result = run_argv("analysis_command", &argv, None) => result.and_then(|out| {
                    if out.status.success() {
                        Ok(())
                    } else {
                        Err(HostError::Analysis(failure_message(&out)))
                    }
                }),
            };

            if outcome.is_ok() {
                if let Ok(mut slot) = slot.lock() {
                    *slot = Some(result_handle(output));
                }
            } else {
                warn!("analysis did not complete");
            }
            let _ = tx.send(outcome);
        });

        Ok(handle)
    }

    fn active_result_layer(&self) -> Option<LayerHandle> {
        self.result.lock().ok().and_then(|slot| slot.clone())
    }
}

fn result_handle(output: PathBuf) -> LayerHandle {
    let name = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let kind = output
        .extension()
        .and_then(|e| e.to_str())
        .and_then(LayerKind::from_extension);
    LayerHandle {
        name,
        source: output,
        kind,
    }
}

/// Substitute `{key}` placeholders in every argument of `template`.
pub(crate) fn expand_template(template: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    template
        .iter()
        .map(|arg| {
            vars.iter().fold(arg.clone(), |acc, (key, value)| {
                acc.replace(&format!("{{{key}}}"), value)
            })
        })
        .collect()
}

/// Run `argv` to completion; the child is killed if the future is dropped.
pub(crate) async fn run_argv(
    setting: &'static str,
    argv: &[String],
    cwd: Option<&Path>,
) -> Result<Output, HostError> {
    let (program, args) = argv
        .split_first()
        .ok_or(HostError::NotConfigured(setting))?;

    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    debug!(program = %program, args = ?args, "spawning");
    Ok(command.output().await?)
}

/// Last few stderr lines, or the exit status when stderr is empty.
pub(crate) fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.trim().lines().collect();
    if lines.is_empty() {
        return format!("exited with {}", output.status);
    }
    lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n")
}
