//! `SmartParser`: one constructible core instance wiring the queue, the
//! pipeline, the result set, export and the activity journal around an
//! injected [`Reporter`].

use std::sync::Arc;
use std::time::Duration;

use smartparse_config::SmartParseConfig;
use smartparse_core::{
    Document, DocumentId, LogEntry, NullReporter, RawFileDescriptor, Reporter, ResultRow, Section,
    Severity, SmartParseError,
};
use tracing::info;

use crate::export::{ExportArtifact, ExportEncoder, ExportService};
use crate::extraction::Extractor;
use crate::journal::Journal;
use crate::orchestrator::{PipelineOrchestrator, RunSummary};
use crate::registry::FileRegistry;
use crate::result_store::{ResultStore, Stats};
use crate::stage_runner::{CancellationFlag, StageWork};

pub struct SmartParser {
    registry: FileRegistry,
    results: ResultStore,
    orchestrator: PipelineOrchestrator,
    exporter: ExportService,
    journal: Journal,
}

impl SmartParser {
    /// Default stages and timings.
    pub fn new(reporter: Arc<dyn Reporter>) -> Self {
        Self::with_config(reporter, &SmartParseConfig::default())
    }

    pub fn with_config(reporter: Arc<dyn Reporter>, config: &SmartParseConfig) -> Self {
        let orchestrator = PipelineOrchestrator::new(config.stages())
            .with_results_view_delay(Duration::from_millis(config.results_view_delay_ms()));
        let exporter = ExportService::new(
            config.export_formats(),
            Duration::from_millis(config.export_delay_ms()),
        );
        Self {
            registry: FileRegistry::new(),
            results: ResultStore::new(config.per_document_seconds()),
            orchestrator,
            exporter,
            journal: Journal::new(reporter, config.activity_capacity()),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.orchestrator.set_extractor(extractor);
        self
    }

    pub fn with_stage_work(mut self, work: Arc<dyn StageWork>) -> Self {
        self.orchestrator.set_stage_work(work);
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn ExportEncoder>) -> Self {
        self.exporter.register(encoder);
        self
    }

    // --- Queue ---

    pub fn add_files<I>(&mut self, descriptors: I) -> Vec<Document>
    where
        I: IntoIterator<Item = RawFileDescriptor>,
    {
        let added = self.registry.add(descriptors);
        if !added.is_empty() {
            info!(count = added.len(), total = self.registry.count(), "Files added");
            self.journal
                .on_notify(&format!("Added {} files", added.len()), Severity::Success);
        }
        added
    }

    pub fn remove_file(&mut self, id: DocumentId) -> Option<Document> {
        let removed = self.registry.remove(id)?;
        info!(document = %removed.name, "File removed");
        self.journal.on_notify("File removed", Severity::Warning);
        Some(removed)
    }

    pub fn preview_file(&self, id: DocumentId) -> Option<&Document> {
        let document = self.registry.get(id)?;
        self.journal
            .on_notify(&format!("Preview: {}", document.name), Severity::Info);
        Some(document)
    }

    pub fn clear_files(&mut self) {
        self.registry.clear();
        self.journal.on_notify("All files removed", Severity::Warning);
    }

    pub fn files(&self) -> &[Document] {
        self.registry.list()
    }

    pub fn file_count(&self) -> usize {
        self.registry.count()
    }

    // --- Run ---

    pub async fn start_run(&mut self) -> Result<RunSummary, SmartParseError> {
        self.orchestrator
            .start_run(&mut self.registry, &mut self.results, &self.journal)
            .await
    }

    /// Set it from another task to stop the current run before its next stage.
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.orchestrator.cancellation_flag()
    }

    // --- Results ---

    pub fn results(&self) -> &[ResultRow] {
        self.results.all()
    }

    pub fn search(&self, query: &str) -> Vec<ResultRow> {
        self.results.search(query)
    }

    pub fn stats(&self) -> Stats {
        self.results.stats()
    }

    pub async fn export(&self, format: &str) -> Result<ExportArtifact, SmartParseError> {
        self.exporter
            .export(self.results.all(), format, &self.journal)
            .await
    }

    pub fn export_formats(&self) -> &[String] {
        self.exporter.formats()
    }

    // --- Journal ---

    /// Activity log, newest first.
    pub fn activity(&self) -> Vec<LogEntry> {
        self.journal.entries()
    }

    /// Last reported `(overall, phase)`.
    pub fn progress(&self) -> (u8, u8) {
        self.journal.progress()
    }

    pub fn clear_log(&self) {
        self.journal.clear_log();
    }

    /// Back to an empty session: no files, no results, fresh log and progress.
    pub fn clear_all(&mut self) {
        self.registry.clear();
        self.results.clear();
        self.journal.clear_log();
        self.journal.reset_progress();
        self.journal.on_section(Section::Upload);
        self.journal.on_notify("All data cleared", Severity::Info);
        info!("Session cleared");
    }
}

impl Default for SmartParser {
    fn default() -> Self {
        Self::new(Arc::new(NullReporter))
    }
}
