//! Advances one document through the stage sequence.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use smartparse_core::{
    Document, DocumentStatus, Reporter, Severity, SmartParseError, Stage,
};
use tracing::{debug, warn};

/// Work performed for a stage once its delay has elapsed.
///
/// Returning an error fails the document and skips its remaining stages.
#[async_trait]
pub trait StageWork: Send + Sync {
    async fn perform(&self, document: &Document, stage: &Stage) -> anyhow::Result<()>;
}

/// Baseline work: the stage delay is the whole job.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedWork;

#[async_trait]
impl StageWork for SimulatedWork {
    async fn perform(&self, _document: &Document, _stage: &Stage) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Cooperative cancellation, checked before every stage delay.
#[derive(Debug, Default, Clone)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// `round(100 * done / total)` with halves rounded up.
pub(crate) fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((200 * done + total) / (2 * total)).min(100) as u8
}

pub struct StageRunner {
    work: Arc<dyn StageWork>,
    cancel: CancellationFlag,
}

impl StageRunner {
    pub fn new(work: Arc<dyn StageWork>, cancel: CancellationFlag) -> Self {
        Self { work, cancel }
    }

    pub fn set_work(&mut self, work: Arc<dyn StageWork>) {
        self.work = work;
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Apply every stage to `document`, in order.
    ///
    /// On `Ok` the document is `Completed` at 100%. A failed stage leaves it
    /// `Failed` at its last progress; cancellation puts it back to `Waiting`.
    pub async fn run(
        &self,
        document: &mut Document,
        stages: &[Stage],
        reporter: &dyn Reporter,
    ) -> Result<(), SmartParseError> {
        let total = stages.len();

        for (i, stage) in stages.iter().enumerate() {
            if self.cancel.is_cancelled() {
                debug!(document = %document.name, stage = %stage.name, "Cancelled before stage");
                document.status = DocumentStatus::Waiting;
                document.progress = 0;
                reporter.on_file_progress(document);
                return Err(SmartParseError::Cancelled);
            }

            tokio::time::sleep(Duration::from_millis(stage.duration_ms)).await;

            if let Err(e) = self.work.perform(document, stage).await {
                warn!(document = %document.name, stage = %stage.name, error = %e, "Stage failed");
                document.status = DocumentStatus::Failed;
                reporter.on_file_progress(document);
                reporter.on_log(
                    &format!("{}: {} failed: {}", document.name, stage.name, e),
                    Severity::Error,
                );
                return Err(SmartParseError::StageFailure {
                    document: document.name.clone(),
                    stage: stage.name.clone(),
                    reason: e.to_string(),
                });
            }

            document.progress = document.progress.max(percent(i + 1, total));
            reporter.on_file_progress(document);
            reporter.on_log(&format!("{}: {}", document.name, stage.name), Severity::Info);
            debug!(document = %document.name, stage = %stage.name, progress = document.progress, "Stage applied");
        }

        document.status = DocumentStatus::Completed;
        document.progress = 100;
        reporter.on_file_progress(document);
        reporter.on_log(
            &format!("{}: processing complete", document.name),
            Severity::Success,
        );
        Ok(())
    }
}
