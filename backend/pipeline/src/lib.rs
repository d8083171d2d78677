//! `smartparse-pipeline`: the document processing core.
//!
//! Queue documents in a [`FileRegistry`], run them through the configured
//! stages with a [`PipelineOrchestrator`], then query or export the rows kept
//! in the [`ResultStore`]. [`SmartParser`] wires all of it together around a
//! caller-supplied `Reporter`.

pub mod app;
pub mod export;
pub mod extraction;
pub mod journal;
pub mod orchestrator;
pub mod registry;
pub mod result_store;
pub mod stage_runner;

pub use app::SmartParser;
pub use export::{CsvEncoder, ExportArtifact, ExportEncoder, ExportService, JsonEncoder};
pub use extraction::{Extraction, Extractor, PlaceholderExtractor, classify_outcome};
pub use journal::Journal;
pub use orchestrator::{PipelineOrchestrator, RunSummary};
pub use registry::FileRegistry;
pub use result_store::{ResultStore, Stats};
pub use stage_runner::{CancellationFlag, SimulatedWork, StageRunner, StageWork};
