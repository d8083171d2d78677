//! Export of result rows into downloadable artifacts.
//!
//! Each format has an [`ExportEncoder`]. Formats without a dedicated encoder
//! fall back to the structured JSON dump under the requested extension.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use smartparse_core::{Reporter, ResultRow, Severity, SmartParseError};
use tracing::{info, warn};

/// Format keys double as file extensions, so only plain ones are accepted.
static FORMAT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+$").unwrap());

/// Serializes rows for one export format.
pub trait ExportEncoder: Send + Sync {
    /// Lower-case format key, also the default file extension.
    fn format(&self) -> &str;

    fn media_type(&self) -> &'static str;

    fn encode(&self, rows: &[ResultRow]) -> anyhow::Result<Vec<u8>>;
}

/// Pretty-printed JSON array, every field preserved.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEncoder;

impl ExportEncoder for JsonEncoder {
    fn format(&self) -> &str {
        "json"
    }

    fn media_type(&self) -> &'static str {
        "application/json"
    }

    fn encode(&self, rows: &[ResultRow]) -> anyhow::Result<Vec<u8>> {
        serde_json::to_vec_pretty(rows).context("serialize rows to JSON")
    }
}

/// One header row, then one record per result row.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvEncoder;

const CSV_HEADER: [&str; 11] = [
    "id",
    "documentId",
    "document",
    "date",
    "counterparty",
    "taxId",
    "amount",
    "vat",
    "kind",
    "outcome",
    "confidence",
];

impl ExportEncoder for CsvEncoder {
    fn format(&self) -> &str {
        "csv"
    }

    fn media_type(&self) -> &'static str {
        "text/csv"
    }

    fn encode(&self, rows: &[ResultRow]) -> anyhow::Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for row in rows {
            writer.write_record([
                row.id.to_string(),
                row.document_id.to_string(),
                row.document.clone(),
                row.date.map(|d| d.to_string()).unwrap_or_default(),
                row.counterparty.clone(),
                row.tax_id.clone(),
                format!("{:.2}", row.amount),
                format!("{:.2}", row.vat),
                row.kind.to_string(),
                row.outcome.to_string(),
                row.confidence.to_string(),
            ])?;
        }
        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flush CSV writer: {}", e.error()))
    }
}

/// A finished export, ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub format: String,
    /// Upper-case display label, e.g. `CSV`.
    pub label: String,
    pub media_type: String,
    pub content: Vec<u8>,
}

impl ExportArtifact {
    /// Write the artifact into `dir`, creating it if needed.
    pub async fn write_to(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create export directory {}", dir.display()))?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.content)
            .await
            .with_context(|| format!("write export {}", path.display()))?;
        info!(path = %path.display(), bytes = self.content.len(), "Export written");
        Ok(path)
    }
}

pub fn export_filename(format: &str, date: NaiveDate) -> String {
    format!("export-{}.{}", date.format("%Y-%m-%d"), format)
}

pub struct ExportService {
    encoders: HashMap<String, Arc<dyn ExportEncoder>>,
    fallback: Arc<dyn ExportEncoder>,
    /// Empty means any format is accepted.
    allowed: Vec<String>,
    delay: Duration,
}

impl ExportService {
    pub fn new(allowed: Vec<String>, delay: Duration) -> Self {
        let mut service = Self {
            encoders: HashMap::new(),
            fallback: Arc::new(JsonEncoder),
            allowed: allowed.into_iter().map(|f| f.trim().to_lowercase()).collect(),
            delay,
        };
        service.register(Arc::new(JsonEncoder));
        service.register(Arc::new(CsvEncoder));
        service
    }

    pub fn register(&mut self, encoder: Arc<dyn ExportEncoder>) {
        self.encoders.insert(encoder.format().to_lowercase(), encoder);
    }

    pub fn formats(&self) -> &[String] {
        &self.allowed
    }

    /// Export `rows` dated today (UTC).
    pub async fn export(
        &self,
        rows: &[ResultRow],
        format: &str,
        reporter: &dyn Reporter,
    ) -> Result<ExportArtifact, SmartParseError> {
        self.export_on(rows, format, Utc::now().date_naive(), reporter)
            .await
    }

    pub async fn export_on(
        &self,
        rows: &[ResultRow],
        format: &str,
        date: NaiveDate,
        reporter: &dyn Reporter,
    ) -> Result<ExportArtifact, SmartParseError> {
        if rows.is_empty() {
            reporter.on_notify("No data to export", Severity::Warning);
            return Err(SmartParseError::NothingToExport);
        }

        let format = format.trim().to_lowercase();
        if !FORMAT_RE.is_match(&format)
            || (!self.allowed.is_empty() && !self.allowed.contains(&format))
        {
            warn!(format = %format, "Rejected export format");
            reporter.on_notify(
                &format!("Unsupported export format: '{format}'"),
                Severity::Warning,
            );
            return Err(SmartParseError::UnsupportedFormat(format));
        }

        let label = format.to_uppercase();
        reporter.on_notify(&format!("Preparing export to {label}..."), Severity::Info);
        tokio::time::sleep(self.delay).await;

        let encoder = self.encoders.get(&format).unwrap_or(&self.fallback);
        let content = match encoder.encode(rows) {
            Ok(content) => content,
            Err(e) => {
                warn!(format = %format, error = %e, "Export encoding failed");
                reporter.on_notify(&format!("Export to {label} failed"), Severity::Error);
                return Err(SmartParseError::Export(e.to_string()));
            }
        };

        info!(format = %format, rows = rows.len(), bytes = content.len(), "Export ready");
        reporter.on_notify(&format!("Export to {label} complete"), Severity::Success);

        Ok(ExportArtifact {
            filename: export_filename(&format, date),
            media_type: encoder.media_type().to_string(),
            format,
            label,
            content,
        })
    }
}
