//! PDF report rendering through configured commands

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::types::HostConfig;

use super::process::{expand_template, failure_message, run_argv};
use super::{HostError, LayerHandle, ReportGenerator};

/// Renders map and table reports by running argv templates with
/// `{layer}` and `{output}` placeholders.
#[derive(Debug, Clone, Default)]
pub struct CommandReportGenerator {
    map_command: Option<Vec<String>>,
    table_command: Option<Vec<String>>,
}

impl CommandReportGenerator {
    pub fn new(map_command: Option<Vec<String>>, table_command: Option<Vec<String>>) -> Self {
        Self {
            map_command,
            table_command,
        }
    }

    pub fn from_config(config: &HostConfig) -> Self {
        Self::new(
            config.map_report_command.clone(),
            config.table_report_command.clone(),
        )
    }

    async fn render(
        &self,
        setting: &'static str,
        template: Option<&Vec<String>>,
        layer: &LayerHandle,
        out: &Path,
    ) -> Result<(), HostError> {
        let template = template.ok_or(HostError::NotConfigured(setting))?;
        let layer_path = layer.source.to_string_lossy().to_string();
        let out_path = out.to_string_lossy().to_string();
        let argv = expand_template(
            template,
            &[("layer", layer_path.as_str()), ("output", out_path.as_str())],
        );

        let output = run_argv(setting, &argv, None).await?;
        if !output.status.success() {
            return Err(HostError::Report(format!(
                "{}: {}",
                out.display(),
                failure_message(&output)
            )));
        }
        info!(report = %out.display(), layer = %layer.name, "report written");
        Ok(())
    }
}

#[async_trait]
impl ReportGenerator for CommandReportGenerator {
    async fn render_map_pdf(&self, layer: &LayerHandle, out: &Path) -> Result<(), HostError> {
        self.render("map_report_command", self.map_command.as_ref(), layer, out)
            .await
    }

    async fn render_table_pdf(&self, layer: &LayerHandle, out: &Path) -> Result<(), HostError> {
        self.render("table_report_command", self.table_command.as_ref(), layer, out)
            .await
    }
}
