//! Collaborator interfaces consumed by the batch runner
//!
//! The runner never reaches into the host application on its own: it is
//! handed a [`HostSession`] and a [`ReportGenerator`] at construction time.
//! Analysis completion is a one-shot [`AnalysisHandle`] the runner awaits.

pub mod layers;
pub mod process;
pub mod report;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::types::{Extent, LayerKind};

pub use process::ProcessHost;
pub use report::CommandReportGenerator;

/// Failures raised by the host session or report generator
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("{0}")]
    Load(String),
    #[error("script {} failed: {message}", path.display())]
    Script { path: PathBuf, message: String },
    #[error("analysis failed: {0}")]
    Analysis(String),
    #[error("report rendering failed: {0}")]
    Report(String),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("analysis was cancelled")]
    Cancelled,
    #[error("analysis ended without signalling completion")]
    Disconnected,
    #[error("no result layer is active after the analysis")]
    NoResultLayer,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reference to a layer held by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerHandle {
    pub name: String,
    pub source: PathBuf,
    pub kind: Option<LayerKind>,
}

/// Completion signal of a running analysis
#[derive(Debug)]
pub struct AnalysisHandle {
    rx: oneshot::Receiver<Result<(), HostError>>,
}

impl AnalysisHandle {
    /// Pair of completion sender (kept by the host) and handle (returned to the runner).
    pub fn channel() -> (oneshot::Sender<Result<(), HostError>>, AnalysisHandle) {
        let (tx, rx) = oneshot::channel();
        (tx, AnalysisHandle { rx })
    }

    /// Handle that is already complete with `result`.
    pub fn ready(result: Result<(), HostError>) -> Self {
        let (tx, handle) = Self::channel();
        let _ = tx.send(result);
        handle
    }

    /// Wait for the host to signal completion.
    pub async fn wait(self) -> Result<(), HostError> {
        self.rx.await.unwrap_or(Err(HostError::Disconnected))
    }
}

/// The host application's single project/layer session
#[async_trait]
pub trait HostSession: Send {
    /// Discard all in-host state and start a blank project.
    async fn new_session(&mut self) -> Result<(), HostError>;

    /// Execute an automation unit inside the host.
    async fn run_script(&mut self, source: &Path) -> Result<(), HostError>;

    /// Load layers given relative to `root`, in order.
    async fn load_layers(
        &mut self,
        root: &Path,
        relative_paths: &[String],
    ) -> Result<(), HostError>;

    async fn select_impact_function(&mut self, id: &str) -> bool;

    async fn select_aggregation_layer(&mut self, path: &str) -> bool;

    async fn set_map_extent(&mut self, extent: Extent);

    /// Start the analysis; completion arrives through the returned handle.
    fn run_analysis(&mut self, cancel: CancellationToken) -> Result<AnalysisHandle, HostError>;

    fn active_result_layer(&self) -> Option<LayerHandle>;
}

/// Map and table PDF renderer
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn render_map_pdf(&self, layer: &LayerHandle, out: &Path) -> Result<(), HostError>;

    async fn render_table_pdf(&self, layer: &LayerHandle, out: &Path) -> Result<(), HostError>;
}
