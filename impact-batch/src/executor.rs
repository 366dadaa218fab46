//! Batch runner
//!
//! Drives one task at a time against the injected host session. Every
//! per-task failure is caught here and recorded on the task as `Fail` plus an
//! error message; nothing from a single task escapes to the caller.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::catalog::{build_catalog, CatalogOptions};
use crate::host::{HostError, HostSession, ReportGenerator};
use crate::prompt::OverwritePrompt;
use crate::report_paths::{existing_reports, report_paths};
use crate::summary::BatchSummary;
use crate::task_model::TaskModel;
use crate::types::{ReportPaths, ScenarioTask, TaskKind, TaskStatus, ValidationError};

/// Runner settings resolved from `BatchConfig`
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Report base directory, may contain `{date}`
    pub report_dir: String,
    /// Root for scenarios without their own `path` key
    pub base_data_dir: PathBuf,
    pub catalog: CatalogOptions,
    /// Where `run_all` writes its summary; `None` skips writing it
    pub summary_path: Option<PathBuf>,
}

/// Result of a `run_one` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Overwrite was declined; the task was not touched
    Skipped,
    Finished(TaskStatus),
}

/// Why a single task failed
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Loading layers failed: \nRoot: {root}\n{layers}\n{source}")]
    Load {
        root: String,
        layers: String,
        #[source]
        source: HostError,
    },
    #[error("cannot set function {0}")]
    FunctionNotFound(String),
    #[error("cannot set aggregation {0}")]
    AggregationNotFound(String),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("Generating report {} failed: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: HostError,
    },
}

pub struct BatchRunner {
    model: TaskModel,
    host: Box<dyn HostSession>,
    reports: Box<dyn ReportGenerator>,
    prompt: Box<dyn OverwritePrompt>,
    settings: RunSettings,
    cancel: CancellationToken,
}

impl BatchRunner {
    pub fn new(
        model: TaskModel,
        host: Box<dyn HostSession>,
        reports: Box<dyn ReportGenerator>,
        prompt: Box<dyn OverwritePrompt>,
        settings: RunSettings,
    ) -> Self {
        Self {
            model,
            host,
            reports,
            prompt,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    pub fn model(&self) -> &TaskModel {
        &self.model
    }

    /// Mutable access, e.g. to `subscribe` for change notifications.
    pub fn model_mut(&mut self) -> &mut TaskModel {
        &mut self.model
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Token handed to every analysis; the runner itself never cancels it.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Rebuild the catalog from `source_dir` and replace the task list.
    pub fn refresh_catalog(&mut self, source_dir: &Path) -> Result<usize> {
        let tasks = build_catalog(source_dir, &self.settings.base_data_dir, self.settings.catalog)?;
        let count = tasks.len();
        self.model.replace(tasks);
        Ok(count)
    }

    /// Run the task at `index`.
    ///
    /// With `check_existing_report`, a scenario whose reports already exist
    /// is only run after the prompt agrees to overwrite them.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub async fn run_one(&mut self, index: usize, check_existing_report: bool) -> RunOutcome {
        let task = self.model.get(index).clone();

        if check_existing_report && task.is_scenario() {
            let existing = existing_reports(&self.settings.report_dir, &[task.label.as_str()]);
            if !existing.is_empty()
                && !self
                    .prompt
                    .confirm_overwrite(&self.settings.report_dir, &existing)
            {
                info!(index, label = %task.label, "overwrite declined, task skipped");
                return RunOutcome::Skipped;
            }
        }

        self.model.set_status(index, TaskStatus::Running);
        info!(index, label = %task.label, kind = task.kind_name(), "task started");

        let result = match &task.kind {
            TaskKind::Script { source_path } => self.run_script(source_path).await.map(|_| None),
            TaskKind::Scenario(scenario) => {
                self.run_scenario(&task.label, scenario).await.map(Some)
            }
        };

        let status = match result {
            Ok(report) => {
                if let Some(paths) = report {
                    self.model.set_report_path(index, paths.map, paths.table);
                }
                TaskStatus::Success
            }
            Err(e) => {
                error!(index, label = %task.label, error = %e, "task failed");
                self.model.set_error_message(index, e.to_string());
                TaskStatus::Fail
            }
        };
        self.model.set_status(index, status);
        RunOutcome::Finished(status)
    }

    /// Run every task in catalog order after a single overwrite check.
    ///
    /// Returns `None` without touching any task if the overwrite prompt is
    /// declined.
    pub async fn run_all(&mut self) -> Option<BatchSummary> {
        let titles: Vec<String> = self
            .model
            .tasks()
            .iter()
            .filter(|t| t.is_scenario())
            .map(|t| t.label.clone())
            .collect();

        let existing = existing_reports(&self.settings.report_dir, &titles);
        if !existing.is_empty()
            && !self
                .prompt
                .confirm_overwrite(&self.settings.report_dir, &existing)
        {
            info!(existing = existing.len(), "overwrite declined, batch aborted");
            return None;
        }

        let mut summary = BatchSummary::default();
        for index in 0..self.model.len() {
            let outcome = self.run_one(index, false).await;
            let passed = outcome == RunOutcome::Finished(TaskStatus::Success);
            summary.push(self.model.get(index).label.clone(), passed);
        }

        info!(
            passed = summary.passed(),
            failed = summary.failed(),
            total = summary.total(),
            "batch finished"
        );

        if let Some(path) = &self.settings.summary_path {
            if let Err(e) = summary.write_to(path) {
                warn!(error = %e, "could not write batch summary");
            }
        }
        Some(summary)
    }

    async fn run_script(&mut self, source: &Path) -> Result<(), TaskError> {
        self.host.new_session().await?;
        self.host.run_script(source).await?;
        Ok(())
    }

    async fn run_scenario(
        &mut self,
        label: &str,
        scenario: &ScenarioTask,
    ) -> Result<ReportPaths, TaskError> {
        // Validate before any host call
        let layers = scenario.layers()?;
        let extent = scenario.parsed_extent()?;

        self.host.new_session().await?;

        info!(root = %scenario.data_root.display(), layers = ?layers, "loading layers");
        self.host
            .load_layers(&scenario.data_root, &layers)
            .await
            .map_err(|source| TaskError::Load {
                root: scenario.data_root.display().to_string(),
                layers: layers.join("\n"),
                source,
            })?;

        if let Some(id) = &scenario.impact_function_id {
            if !self.host.select_impact_function(id).await {
                return Err(TaskError::FunctionNotFound(id.clone()));
            }
        }

        if let Some(aggregation) = &scenario.aggregation {
            if !self.host.select_aggregation_layer(aggregation).await {
                return Err(TaskError::AggregationNotFound(aggregation.clone()));
            }
        }

        if let Some(extent) = extent {
            self.host.set_map_extent(extent).await;
        }

        let handle = self.host.run_analysis(self.cancel.child_token())?;
        handle.wait().await?;
        debug!(label, "analysis complete");

        let layer = self
            .host
            .active_result_layer()
            .ok_or(HostError::NoResultLayer)?;

        let paths = report_paths(&self.settings.report_dir, label);
        if let Some(dir) = paths.map.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| TaskError::Report {
                    path: paths.map.clone(),
                    source: e.into(),
                })?;
        }

        self.reports
            .render_map_pdf(&layer, &paths.map)
            .await
            .map_err(|source| TaskError::Report {
                path: paths.map.clone(),
                source,
            })?;
        self.reports
            .render_table_pdf(&layer, &paths.table)
            .await
            .map_err(|source| TaskError::Report {
                path: paths.table.clone(),
                source,
            })?;

        info!(map = %paths.map.display(), table = %paths.table.display(), "reports generated");
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AnalysisHandle, LayerHandle};
    use crate::prompt::FixedAnswer;
    use crate::types::{Extent, Task};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    type CallLog = Arc<Mutex<Vec<String>>>;

    #[derive(Default)]
    struct FakeHost {
        calls: CallLog,
        fail_load: bool,
        fail_script: bool,
        reject_function: bool,
        reject_aggregation: bool,
        analysis_error: bool,
    }

    impl FakeHost {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    #[async_trait]
    impl HostSession for FakeHost {
        async fn new_session(&mut self) -> Result<(), HostError> {
            self.record("new_session");
            Ok(())
        }

        async fn run_script(&mut self, source: &Path) -> Result<(), HostError> {
            self.record(format!("run_script {}", source.display()));
            if self.fail_script {
                return Err(HostError::Script {
                    path: source.to_path_buf(),
                    message: "State not as expected.".to_string(),
                });
            }
            Ok(())
        }

        async fn load_layers(
            &mut self,
            _root: &Path,
            relative_paths: &[String],
        ) -> Result<(), HostError> {
            self.record(format!("load_layers {}", relative_paths.join(",")));
            if self.fail_load {
                return Err(HostError::Load(
                    "File flood.csv had illegal extension".to_string(),
                ));
            }
            Ok(())
        }

        async fn select_impact_function(&mut self, id: &str) -> bool {
            self.record(format!("select_impact_function {id}"));
            !self.reject_function
        }

        async fn select_aggregation_layer(&mut self, path: &str) -> bool {
            self.record(format!("select_aggregation_layer {path}"));
            !self.reject_aggregation
        }

        async fn set_map_extent(&mut self, extent: Extent) {
            self.record(format!("set_map_extent {extent}"));
        }

        fn run_analysis(
            &mut self,
            _cancel: CancellationToken,
        ) -> Result<AnalysisHandle, HostError> {
            self.record("run_analysis");
            let (tx, handle) = AnalysisHandle::channel();
            let result = if self.analysis_error {
                Err(HostError::Analysis("no features".to_string()))
            } else {
                Ok(())
            };
            tokio::spawn(async move {
                let _ = tx.send(result);
            });
            Ok(handle)
        }

        fn active_result_layer(&self) -> Option<LayerHandle> {
            Some(LayerHandle {
                name: "impact".to_string(),
                source: PathBuf::from("/work/impact.shp"),
                kind: None,
            })
        }
    }

    #[derive(Default)]
    struct FakeReports {
        calls: CallLog,
        fail_map: bool,
    }

    #[async_trait]
    impl ReportGenerator for FakeReports {
        async fn render_map_pdf(&self, _layer: &LayerHandle, out: &Path) -> Result<(), HostError> {
            self.calls.lock().unwrap().push(format!("map {}", out.display()));
            if self.fail_map {
                return Err(HostError::Report("no composer".to_string()));
            }
            Ok(())
        }

        async fn render_table_pdf(
            &self,
            _layer: &LayerHandle,
            out: &Path,
        ) -> Result<(), HostError> {
            self.calls.lock().unwrap().push(format!("table {}", out.display()));
            Ok(())
        }
    }

    struct CountingPrompt {
        answer: bool,
        asked: Arc<AtomicUsize>,
    }

    impl OverwritePrompt for CountingPrompt {
        fn confirm_overwrite(&self, _report_dir: &str, _existing: &[PathBuf]) -> bool {
            self.asked.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    fn scenario(extent: Option<&str>) -> ScenarioTask {
        ScenarioTask {
            data_root: PathBuf::from("/data"),
            source_file: PathBuf::from("/scenarios/s.txt"),
            hazard: Some("flood.tif".to_string()),
            exposure: Some("roads.shp".to_string()),
            aggregation: None,
            impact_function_id: Some("FloodRoadImpact".to_string()),
            extent: extent.map(str::to_string),
            extra: BTreeMap::new(),
        }
    }

    fn settings(report_dir: &Path) -> RunSettings {
        RunSettings {
            report_dir: report_dir.to_string_lossy().to_string(),
            base_data_dir: PathBuf::from("/data"),
            catalog: CatalogOptions::default(),
            summary_path: None,
        }
    }

    fn runner(
        tasks: Vec<Task>,
        host: FakeHost,
        report_dir: &Path,
        prompt: Box<dyn OverwritePrompt>,
    ) -> BatchRunner {
        runner_with_reports(tasks, host, FakeReports::default(), report_dir, prompt)
    }

    fn runner_with_reports(
        tasks: Vec<Task>,
        host: FakeHost,
        reports: FakeReports,
        report_dir: &Path,
        prompt: Box<dyn OverwritePrompt>,
    ) -> BatchRunner {
        BatchRunner::new(
            TaskModel::new(tasks),
            Box::new(host),
            Box::new(reports),
            prompt,
            settings(report_dir),
        )
    }

    fn calls(log: &CallLog) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_scenario_success_sets_report_paths() {
        let tmp = TempDir::new().unwrap();
        let reports_dir = tmp.path().join("reports");
        let host = FakeHost::default();
        let log = host.calls.clone();
        let mut runner = runner(
            vec![Task::scenario("jakarta flood", scenario(Some("106.7, -6.3, 106.9, -6.1")))],
            host,
            &reports_dir,
            Box::new(FixedAnswer(true)),
        );

        let outcome = runner.run_one(0, true).await;

        assert_eq!(outcome, RunOutcome::Finished(TaskStatus::Success));
        let task = runner.model().get(0);
        let report = task.report.as_ref().unwrap();
        assert_eq!(report.map, reports_dir.join("jakarta_flood.pdf"));
        assert_eq!(report.table, reports_dir.join("jakarta_flood_table.pdf"));
        assert!(task.error_detail.is_none());
        assert!(reports_dir.is_dir());
        assert_eq!(
            calls(&log),
            vec![
                "new_session",
                "load_layers flood.tif,roads.shp",
                "select_impact_function FloodRoadImpact",
                "set_map_extent 106.7,-6.3,106.9,-6.1",
                "run_analysis",
            ]
        );
    }

    #[tokio::test]
    async fn test_bad_extent_fails_before_any_host_call() {
        let tmp = TempDir::new().unwrap();
        let host = FakeHost::default();
        let log = host.calls.clone();
        let mut runner = runner(
            vec![Task::scenario("bad", scenario(Some("1,2,3")))],
            host,
            tmp.path(),
            Box::new(FixedAnswer(true)),
        );

        let outcome = runner.run_one(0, false).await;

        assert_eq!(outcome, RunOutcome::Finished(TaskStatus::Fail));
        assert!(calls(&log).is_empty());
        let detail = runner.model().get(0).error_detail.clone().unwrap();
        assert!(detail.contains("got 3"));
    }

    #[tokio::test]
    async fn test_missing_exposure_is_validation_failure() {
        let tmp = TempDir::new().unwrap();
        let host = FakeHost::default();
        let log = host.calls.clone();
        let mut s = scenario(None);
        s.exposure = None;
        let mut runner = runner(
            vec![Task::scenario("s", s)],
            host,
            tmp.path(),
            Box::new(FixedAnswer(true)),
        );

        assert_eq!(
            runner.run_one(0, false).await,
            RunOutcome::Finished(TaskStatus::Fail)
        );
        assert!(calls(&log).is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_stops_task() {
        let tmp = TempDir::new().unwrap();
        let host = FakeHost {
            fail_load: true,
            ..FakeHost::default()
        };
        let log = host.calls.clone();
        let mut runner = runner(
            vec![Task::scenario("s", scenario(None))],
            host,
            tmp.path(),
            Box::new(FixedAnswer(true)),
        );

        assert_eq!(runner.run_one(0, false).await, RunOutcome::Finished(TaskStatus::Fail));
        let detail = runner.model().get(0).error_detail.clone().unwrap();
        assert!(detail.starts_with("Loading layers failed: \nRoot: /data"));
        assert!(!calls(&log).iter().any(|c| c == "run_analysis"));
    }

    #[tokio::test]
    async fn test_function_rejected() {
        let tmp = TempDir::new().unwrap();
        let host = FakeHost {
            reject_function: true,
            ..FakeHost::default()
        };
        let mut runner = runner(
            vec![Task::scenario("s", scenario(None))],
            host,
            tmp.path(),
            Box::new(FixedAnswer(true)),
        );

        assert_eq!(runner.run_one(0, false).await, RunOutcome::Finished(TaskStatus::Fail));
        assert_eq!(
            runner.model().get(0).error_detail.as_deref(),
            Some("cannot set function FloodRoadImpact")
        );
    }

    #[tokio::test]
    async fn test_aggregation_rejected() {
        let tmp = TempDir::new().unwrap();
        let host = FakeHost {
            reject_aggregation: true,
            ..FakeHost::default()
        };
        let log = host.calls.clone();
        let mut s = scenario(None);
        s.aggregation = Some("kabupaten.shp".to_string());
        let mut runner = runner(
            vec![Task::scenario("s", s)],
            host,
            tmp.path(),
            Box::new(FixedAnswer(true)),
        );

        assert_eq!(
            runner.run_one(0, false).await,
            RunOutcome::Finished(TaskStatus::Fail)
        );
        assert_eq!(
            runner.model().get(0).error_detail.as_deref(),
            Some("cannot set aggregation kabupaten.shp")
        );
        let calls = calls(&log);
        assert!(calls.contains(&"load_layers flood.tif,roads.shp,kabupaten.shp".to_string()));
        assert!(!calls.iter().any(|c| c == "run_analysis"));
    }

    #[tokio::test]
    async fn test_report_failure_is_fail_without_paths() {
        let tmp = TempDir::new().unwrap();
        let reports_dir = tmp.path().join("reports");
        let reports = FakeReports {
            fail_map: true,
            ..FakeReports::default()
        };
        let report_log = reports.calls.clone();
        let mut runner = runner_with_reports(
            vec![Task::scenario("jakarta flood", scenario(None))],
            FakeHost::default(),
            reports,
            &reports_dir,
            Box::new(FixedAnswer(true)),
        );

        assert_eq!(
            runner.run_one(0, false).await,
            RunOutcome::Finished(TaskStatus::Fail)
        );
        let task = runner.model().get(0);
        assert!(task.report.is_none());
        let detail = task.error_detail.clone().unwrap();
        assert!(detail.starts_with("Generating report"));
        assert!(detail.contains("jakarta_flood.pdf"));
        assert!(detail.contains("no composer"));
        // table is never attempted once the map fails
        assert_eq!(calls(&report_log).len(), 1);
    }

    #[tokio::test]
    async fn test_analysis_error_is_fail() {
        let tmp = TempDir::new().unwrap();
        let host = FakeHost {
            analysis_error: true,
            ..FakeHost::default()
        };
        let mut runner = runner(
            vec![Task::scenario("s", scenario(None))],
            host,
            tmp.path(),
            Box::new(FixedAnswer(true)),
        );

        assert_eq!(runner.run_one(0, false).await, RunOutcome::Finished(TaskStatus::Fail));
        assert!(runner.model().get(0).report.is_none());
    }

    #[tokio::test]
    async fn test_script_failure_recorded() {
        let tmp = TempDir::new().unwrap();
        let host = FakeHost {
            fail_script: true,
            ..FakeHost::default()
        };
        let mut runner = runner(
            vec![Task::script("basic.py", "/scripts/basic.py")],
            host,
            tmp.path(),
            Box::new(FixedAnswer(true)),
        );

        assert_eq!(runner.run_one(0, true).await, RunOutcome::Finished(TaskStatus::Fail));
        let detail = runner.model().get(0).error_detail.clone().unwrap();
        assert!(detail.contains("State not as expected."));
        assert_eq!(runner.model().running_index(), None);
    }

    #[tokio::test]
    async fn test_declined_single_run_is_noop() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("s.pdf"), b"%PDF").unwrap();
        let host = FakeHost::default();
        let log = host.calls.clone();
        let mut runner = runner(
            vec![Task::scenario("s", scenario(None))],
            host,
            tmp.path(),
            Box::new(FixedAnswer(false)),
        );

        assert_eq!(runner.run_one(0, true).await, RunOutcome::Skipped);
        assert_eq!(runner.model().get(0).status, TaskStatus::Normal);
        assert!(calls(&log).is_empty());
    }

    #[tokio::test]
    async fn test_run_all_declined_leaves_statuses() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("second_table.pdf"), b"%PDF").unwrap();
        let asked = Arc::new(AtomicUsize::new(0));
        let host = FakeHost::default();
        let log = host.calls.clone();
        let mut runner = runner(
            vec![
                Task::script("basic.py", "/scripts/basic.py"),
                Task::scenario("first", scenario(None)),
                Task::scenario("second", scenario(None)),
            ],
            host,
            tmp.path(),
            Box::new(CountingPrompt {
                answer: false,
                asked: asked.clone(),
            }),
        );
        runner.model_mut().set_status(1, TaskStatus::Fail);
        let before: Vec<TaskStatus> = runner.model().tasks().iter().map(|t| t.status).collect();

        assert!(runner.run_all().await.is_none());

        let after: Vec<TaskStatus> = runner.model().tasks().iter().map(|t| t.status).collect();
        assert_eq!(before, after);
        assert_eq!(asked.load(Ordering::SeqCst), 1);
        assert!(calls(&log).is_empty());
    }

    #[tokio::test]
    async fn test_run_all_asks_once_and_counts_every_task() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("first.pdf"), b"%PDF").unwrap();
        fs::write(tmp.path().join("second.pdf"), b"%PDF").unwrap();
        let asked = Arc::new(AtomicUsize::new(0));
        let summary_path = tmp.path().join("batch-report.txt");

        let mut runner = BatchRunner::new(
            TaskModel::new(vec![
                Task::script("basic.py", "/scripts/basic.py"),
                Task::scenario("first", scenario(None)),
                Task::scenario("second", scenario(Some("1,2,3"))),
            ]),
            Box::new(FakeHost::default()),
            Box::new(FakeReports::default()),
            Box::new(CountingPrompt {
                answer: true,
                asked: asked.clone(),
            }),
            RunSettings {
                summary_path: Some(summary_path.clone()),
                ..settings(tmp.path())
            },
        );

        let summary = runner.run_all().await.unwrap();

        assert_eq!(asked.load(Ordering::SeqCst), 1);
        assert_eq!(summary.passed(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.total(), 3);
        let written = fs::read_to_string(&summary_path).unwrap();
        assert!(written.contains("P: basic.py\nP: first\nF: second\n"));
    }

    #[tokio::test]
    async fn test_run_all_continues_after_failed_task() {
        let tmp = TempDir::new().unwrap();
        let host = FakeHost::default();
        let log = host.calls.clone();
        let mut runner = runner(
            vec![
                Task::scenario("broken", scenario(Some("1,2,3"))),
                Task::scenario("jakarta flood", scenario(None)),
            ],
            host,
            tmp.path(),
            Box::new(FixedAnswer(true)),
        );

        let summary = runner.run_all().await.unwrap();

        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.failed(), 1);
        let statuses: Vec<TaskStatus> = runner.model().tasks().iter().map(|t| t.status).collect();
        assert_eq!(statuses, vec![TaskStatus::Fail, TaskStatus::Success]);
        assert_eq!(runner.model().running_index(), None);
        assert!(runner.model().get(0).report.is_none());
        assert_eq!(
            runner.model().get(1).report.as_ref().unwrap().map,
            tmp.path().join("jakarta_flood.pdf")
        );
        assert_eq!(
            calls(&log).iter().filter(|c| *c == "run_analysis").count(),
            1
        );
    }

    #[tokio::test]
    async fn test_refresh_catalog_replaces_tasks() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.py"), "").unwrap();
        fs::write(
            source.join("b.txt"),
            "[x]\nhazard: h.shp\nexposure: e.shp\n[y]\nhazard: h.shp\nexposure: e.shp\n",
        )
        .unwrap();

        let mut runner = runner(
            Vec::new(),
            FakeHost::default(),
            tmp.path(),
            Box::new(FixedAnswer(true)),
        );
        let count = runner.refresh_catalog(&source).unwrap();

        assert_eq!(count, 3);
        let labels: Vec<&str> = runner.model().tasks().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["a.py", "x", "y"]);
    }
}
