//! Drives a full run over the queue and materializes the result set.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use smartparse_core::{
    DocumentStatus, Reporter, ResultRow, Section, Severity, SmartParseError, Stage,
};
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::extraction::{Extraction, Extractor, PlaceholderExtractor};
use crate::registry::FileRegistry;
use crate::result_store::ResultStore;
use crate::stage_runner::{CancellationFlag, SimulatedWork, StageRunner, StageWork, percent};

/// Highest phase number shown by the step indicator.
const MAX_PHASE: u8 = 5;

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub documents: usize,
    pub completed: usize,
    pub failed: usize,
    pub rows: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Coarse step indicator derived from overall progress.
pub fn phase_for(overall: u8) -> u8 {
    (overall / 20 + 1).min(MAX_PHASE)
}

pub struct PipelineOrchestrator {
    stages: Vec<Stage>,
    runner: StageRunner,
    extractor: Arc<dyn Extractor>,
    results_view_delay: Duration,
}

impl PipelineOrchestrator {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            runner: StageRunner::new(Arc::new(SimulatedWork), CancellationFlag::new()),
            extractor: Arc::new(PlaceholderExtractor),
            results_view_delay: Duration::ZERO,
        }
    }

    pub fn with_results_view_delay(mut self, delay: Duration) -> Self {
        self.results_view_delay = delay;
        self
    }

    pub fn set_extractor(&mut self, extractor: Arc<dyn Extractor>) {
        self.extractor = extractor;
    }

    pub fn set_stage_work(&mut self, work: Arc<dyn StageWork>) {
        self.runner.set_work(work);
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.runner.cancellation_flag()
    }

    /// Process every queued document, strictly one after another, then
    /// replace the result set with one row per document.
    ///
    /// An empty queue is rejected without touching any state. Failures after
    /// that point leave the registry as far as it got.
    pub async fn start_run(
        &self,
        registry: &mut FileRegistry,
        results: &mut ResultStore,
        reporter: &dyn Reporter,
    ) -> Result<RunSummary, SmartParseError> {
        if registry.is_empty() {
            reporter.on_notify("Upload files before parsing", Severity::Warning);
            return Err(SmartParseError::EmptyQueue);
        }

        reporter.on_section(Section::Parse);
        reporter.on_notify("Parsing started", Severity::Info);

        match self.execute(registry, results, reporter).await {
            Ok(summary) => {
                if summary.failed > 0 {
                    let counts = format!("{} of {} files failed", summary.failed, summary.documents);
                    reporter.on_notify(&format!("Parsing finished: {counts}"), Severity::Warning);
                    reporter.on_log(&format!("Processing finished: {counts}"), Severity::Warning);
                } else {
                    reporter.on_notify("Parsing completed successfully", Severity::Success);
                    reporter.on_log("All files processed", Severity::Success);
                }
                info!(
                    documents = summary.documents,
                    failed = summary.failed,
                    elapsed_ms = summary.elapsed.as_millis() as u64,
                    "Run completed"
                );
                tokio::time::sleep(self.results_view_delay).await;
                reporter.on_section(Section::Results);
                Ok(summary)
            }
            Err(SmartParseError::Cancelled) => {
                warn!("Run cancelled");
                reporter.on_notify("Parsing cancelled", Severity::Warning);
                reporter.on_log("Processing cancelled", Severity::Warning);
                Err(SmartParseError::Cancelled)
            }
            Err(e) => {
                error!(error = %e, "Run failed");
                let message = match e {
                    SmartParseError::RunFailure(message) => message,
                    other => other.to_string(),
                };
                reporter.on_notify("Error while processing files", Severity::Error);
                reporter.on_log(&format!("Error: {message}"), Severity::Error);
                Err(SmartParseError::RunFailure(message))
            }
        }
    }

    async fn execute(
        &self,
        registry: &mut FileRegistry,
        results: &mut ResultStore,
        reporter: &dyn Reporter,
    ) -> Result<RunSummary, SmartParseError> {
        let started = Instant::now();
        let total = registry.count();
        self.runner.cancellation_flag().reset();

        reporter.on_progress(0, 1);
        reporter.on_log("Processing started", Severity::Info);
        info!(documents = total, stages = self.stages.len(), "Run started");

        let mut failed = 0;
        for index in 0..total {
            let document = registry.get_mut_at(index).ok_or_else(|| {
                SmartParseError::RunFailure(format!("document {index} left the queue mid-run"))
            })?;
            document.status = DocumentStatus::Processing;
            document.progress = 0;
            reporter.on_file_progress(document);

            match self.runner.run(document, &self.stages, reporter).await {
                Ok(()) => {}
                Err(SmartParseError::StageFailure { document, stage, reason }) => {
                    warn!(document = %document, stage = %stage, reason = %reason, "Document failed");
                    failed += 1;
                }
                Err(e) => return Err(e),
            }

            let overall = percent(index + 1, total);
            reporter.on_progress(overall, phase_for(overall));
        }

        let rows = self.generate_rows(registry).await?;
        let row_count = rows.len();
        results.set_all(rows);

        Ok(RunSummary {
            documents: total,
            completed: total - failed,
            failed,
            rows: row_count,
            elapsed: started.elapsed(),
        })
    }

    /// One row per document in registry order. Failed documents yield an
    /// empty extraction, which classifies as an error.
    async fn generate_rows(
        &self,
        registry: &FileRegistry,
    ) -> Result<Vec<ResultRow>, SmartParseError> {
        let mut rows = Vec::with_capacity(registry.count());
        for (position, document) in registry.list().iter().enumerate() {
            let extraction = match document.status {
                DocumentStatus::Completed => self
                    .extractor
                    .extract(document, position)
                    .await
                    .map_err(|e| {
                        SmartParseError::RunFailure(format!(
                            "extraction failed for {}: {e}",
                            document.name
                        ))
                    })?,
                _ => Extraction::empty(),
            };
            rows.push(extraction.into_row(position as u64 + 1, document));
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use async_trait::async_trait;
    use smartparse_core::{CollectingReporter, Document, Outcome, RawFileDescriptor, ReportEvent};

    fn stages() -> Vec<Stage> {
        vec![Stage::new("Loading file", 500), Stage::new("Parsing data", 1_500)]
    }

    fn registry(names: &[&str]) -> FileRegistry {
        let mut registry = FileRegistry::new();
        registry.add(names.iter().map(|n| RawFileDescriptor::new(*n, 4096)));
        registry
    }

    struct FailFor(&'static str);

    #[async_trait]
    impl StageWork for FailFor {
        async fn perform(&self, document: &Document, _stage: &Stage) -> anyhow::Result<()> {
            if document.name == self.0 {
                bail!("checksum mismatch");
            }
            Ok(())
        }
    }

    struct BrokenExtractor;

    #[async_trait]
    impl Extractor for BrokenExtractor {
        async fn extract(&self, _document: &Document, _position: usize) -> anyhow::Result<Extraction> {
            bail!("model unavailable")
        }
    }

    struct CancelOn {
        name: &'static str,
        flag: CancellationFlag,
    }

    #[async_trait]
    impl StageWork for CancelOn {
        async fn perform(&self, document: &Document, _stage: &Stage) -> anyhow::Result<()> {
            if document.name == self.name {
                self.flag.cancel();
            }
            Ok(())
        }
    }

    #[test]
    fn phase_is_capped() {
        assert_eq!(phase_for(0), 1);
        assert_eq!(phase_for(19), 1);
        assert_eq!(phase_for(20), 2);
        assert_eq!(phase_for(67), 4);
        assert_eq!(phase_for(99), 5);
        assert_eq!(phase_for(100), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_queue_changes_nothing() {
        let orchestrator = PipelineOrchestrator::new(stages());
        let reporter = CollectingReporter::new();
        let mut registry = FileRegistry::new();
        let mut results = ResultStore::new(2);

        let err = orchestrator
            .start_run(&mut registry, &mut results, &reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, SmartParseError::EmptyQueue));
        assert!(results.is_empty());
        assert_eq!(
            reporter.events(),
            vec![ReportEvent::Notify {
                message: "Upload files before parsing".into(),
                severity: Severity::Warning,
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn run_completes_every_document() {
        let orchestrator = PipelineOrchestrator::new(stages());
        let reporter = CollectingReporter::new();
        let mut registry = registry(&["a.pdf", "b.csv", "c.png"]);
        let mut results = ResultStore::new(2);

        let summary = orchestrator
            .start_run(&mut registry, &mut results, &reporter)
            .await
            .unwrap();

        assert_eq!(summary.documents, 3);
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.rows, 3);
        assert!(summary.elapsed >= Duration::from_millis(6_000));
        assert!(registry
            .list()
            .iter()
            .all(|d| d.status == DocumentStatus::Completed && d.progress == 100));
        assert_eq!(results.all().len(), 3);
        let ids: Vec<u64> = results.all().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(results.all()[2].document, "c.png");

        assert_eq!(reporter.progress(), vec![(0, 1), (33, 2), (67, 4), (100, 5)]);
    }

    #[tokio::test(start_paused = true)]
    async fn documents_run_strictly_in_order() {
        let orchestrator = PipelineOrchestrator::new(stages());
        let reporter = CollectingReporter::new();
        let mut registry = registry(&["first.pdf", "second.pdf"]);
        let mut results = ResultStore::new(2);
        orchestrator
            .start_run(&mut registry, &mut results, &reporter)
            .await
            .unwrap();

        let logs: Vec<String> = reporter.logs().into_iter().map(|(m, _)| m).collect();
        assert_eq!(
            logs,
            vec![
                "Processing started",
                "first.pdf: Loading file",
                "first.pdf: Parsing data",
                "first.pdf: processing complete",
                "second.pdf: Loading file",
                "second.pdf: Parsing data",
                "second.pdf: processing complete",
                "All files processed",
            ]
        );

        // No update for the first document once the second has started.
        let names: Vec<String> = reporter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ReportEvent::FileProgress { document } => Some(document.name),
                _ => None,
            })
            .collect();
        let switch = names.iter().position(|n| n == "second.pdf").unwrap();
        assert!(names[..switch].iter().all(|n| n == "first.pdf"));
        assert!(names[switch..].iter().all(|n| n == "second.pdf"));
    }

    #[tokio::test(start_paused = true)]
    async fn stage_failure_does_not_abort_run() {
        let mut orchestrator = PipelineOrchestrator::new(stages());
        orchestrator.set_stage_work(Arc::new(FailFor("broken.pdf")));
        let reporter = CollectingReporter::new();
        let mut registry = registry(&["ok.pdf", "broken.pdf", "also-ok.xlsx"]);
        let mut results = ResultStore::new(2);

        let summary = orchestrator
            .start_run(&mut registry, &mut results, &reporter)
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.completed, 2);
        let statuses: Vec<_> = registry.list().iter().map(|d| d.status).collect();
        assert_eq!(
            statuses,
            vec![DocumentStatus::Completed, DocumentStatus::Failed, DocumentStatus::Completed]
        );
        assert_eq!(results.all().len(), 3);
        assert_eq!(results.all()[1].outcome, Outcome::Error);
        assert!(results.all()[1].counterparty.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_documents_make_the_run_end_with_a_warning() {
        let mut orchestrator = PipelineOrchestrator::new(stages());
        orchestrator.set_stage_work(Arc::new(FailFor("broken.pdf")));
        let reporter = CollectingReporter::new();
        let mut registry = registry(&["ok.pdf", "broken.pdf"]);
        let mut results = ResultStore::new(2);

        let summary = orchestrator
            .start_run(&mut registry, &mut results, &reporter)
            .await
            .unwrap();
        assert_eq!(summary.failed, 1);

        let notes = reporter.notifications();
        assert_eq!(
            notes.last(),
            Some(&("Parsing finished: 1 of 2 files failed".to_string(), Severity::Warning))
        );
        assert!(!notes.iter().any(|(_, severity)| *severity == Severity::Success));
        assert_eq!(
            reporter.logs().last(),
            Some(&("Processing finished: 1 of 2 files failed".to_string(), Severity::Warning))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn extractor_error_is_run_failure() {
        let mut orchestrator = PipelineOrchestrator::new(stages());
        orchestrator.set_extractor(Arc::new(BrokenExtractor));
        let reporter = CollectingReporter::new();
        let mut registry = registry(&["a.pdf"]);
        let mut results = ResultStore::new(2);

        let err = orchestrator
            .start_run(&mut registry, &mut results, &reporter)
            .await
            .unwrap_err();

        let SmartParseError::RunFailure(message) = err else {
            panic!("expected RunFailure, got {err:?}");
        };
        assert!(message.contains("model unavailable"));
        assert!(results.is_empty());
        // Partial state stays: the document already completed.
        assert_eq!(registry.list()[0].status, DocumentStatus::Completed);
        let last_log = reporter.logs().pop().unwrap();
        assert_eq!(last_log.1, Severity::Error);
        assert!(last_log.0.starts_with("Error: "));
        assert!(reporter
            .notifications()
            .contains(&("Error while processing files".to_string(), Severity::Error)));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_leaves_rest_waiting() {
        let mut orchestrator = PipelineOrchestrator::new(stages());
        let flag = orchestrator.cancellation_flag();
        orchestrator.set_stage_work(Arc::new(CancelOn { name: "b.pdf", flag }));
        let reporter = CollectingReporter::new();
        let mut registry = registry(&["a.pdf", "b.pdf", "c.pdf"]);
        let mut results = ResultStore::new(2);

        let err = orchestrator
            .start_run(&mut registry, &mut results, &reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, SmartParseError::Cancelled));
        let statuses: Vec<_> = registry.list().iter().map(|d| d.status).collect();
        assert_eq!(
            statuses,
            vec![DocumentStatus::Completed, DocumentStatus::Waiting, DocumentStatus::Waiting]
        );
        assert!(results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn results_section_follows_delay() {
        let orchestrator =
            PipelineOrchestrator::new(stages()).with_results_view_delay(Duration::from_secs(1));
        let reporter = CollectingReporter::new();
        let mut registry = registry(&["a.pdf"]);
        let mut results = ResultStore::new(2);
        orchestrator
            .start_run(&mut registry, &mut results, &reporter)
            .await
            .unwrap();

        let sections: Vec<Section> = reporter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ReportEvent::Section { section } => Some(section),
                _ => None,
            })
            .collect();
        assert_eq!(sections, vec![Section::Parse, Section::Results]);
        assert!(matches!(reporter.events().last(), Some(ReportEvent::Section { .. })));
    }
}
