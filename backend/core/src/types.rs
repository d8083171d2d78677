use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a queued document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file handed over by the file-selection collaborator.
///
/// `handle` is carried along for the presentation layer; the core never opens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFileDescriptor {
    pub name: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<PathBuf>,
}

impl RawFileDescriptor {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            handle: None,
        }
    }

    pub fn with_handle(mut self, handle: impl Into<PathBuf>) -> Self {
        self.handle = Some(handle.into());
        self
    }
}

/// Coarse document family, derived from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    #[serde(rename = "PDF")]
    Pdf,
    Excel,
    #[serde(rename = "CSV")]
    Csv,
    Image,
    Other,
}

impl DocumentKind {
    pub fn from_filename(name: &str) -> Self {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return DocumentKind::Other;
        };
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => DocumentKind::Pdf,
            "xls" | "xlsx" => DocumentKind::Excel,
            "csv" | "txt" => DocumentKind::Csv,
            "jpg" | "jpeg" | "png" => DocumentKind::Image,
            _ => DocumentKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Excel => "Excel",
            DocumentKind::Csv => "CSV",
            DocumentKind::Image => "Image",
            DocumentKind::Other => "Other",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a document inside the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Waiting,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentStatus::Waiting => "waiting",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One queued document and its processing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub size_bytes: u64,
    pub kind: DocumentKind,
    pub status: DocumentStatus,
    /// 0..=100
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<PathBuf>,
}

impl Document {
    pub fn from_descriptor(descriptor: RawFileDescriptor) -> Self {
        Self {
            id: DocumentId::new(),
            kind: DocumentKind::from_filename(&descriptor.name),
            name: descriptor.name,
            size_bytes: descriptor.size_bytes,
            status: DocumentStatus::Waiting,
            progress: 0,
            handle: descriptor.handle,
        }
    }

    pub fn display_size(&self) -> String {
        format_file_size(self.size_bytes)
    }
}

/// Human-readable size in base-1024 units, at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// A named, timed step applied to every document in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub name: String,
    pub duration_ms: u64,
}

impl Stage {
    pub fn new(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            duration_ms,
        }
    }
}

/// Classification of a single extraction result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Outcome {
    Success,
    Partial,
    Error,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Success => "Success",
            Outcome::Partial => "Partial",
            Outcome::Error => "Error",
        };
        f.write_str(s)
    }
}

/// One derived output record, produced at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub id: u64,
    pub document_id: DocumentId,
    pub document: String,
    pub date: Option<NaiveDate>,
    pub counterparty: String,
    pub tax_id: String,
    pub amount: f64,
    pub vat: f64,
    pub kind: DocumentKind,
    pub outcome: Outcome,
    pub confidence: u8,
}

impl ResultRow {
    /// Visible fields joined into one string, used for table search.
    pub fn search_text(&self) -> String {
        let date = self.date.map(|d| d.to_string()).unwrap_or_default();
        [
            self.id.to_string(),
            self.document.clone(),
            date,
            self.counterparty.clone(),
            self.tax_id.clone(),
            format!("{:.2}", self.amount),
            format!("{:.2}", self.vat),
            self.kind.to_string(),
            self.outcome.to_string(),
        ]
        .join("\t")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(DocumentKind::from_filename("doc1.pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("Report.XLSX"), DocumentKind::Excel);
        assert_eq!(DocumentKind::from_filename("old.xls"), DocumentKind::Excel);
        assert_eq!(DocumentKind::from_filename("notes.txt"), DocumentKind::Csv);
        assert_eq!(DocumentKind::from_filename("scan.jpeg"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_filename("archive.tar.gz"), DocumentKind::Other);
        assert_eq!(DocumentKind::from_filename("README"), DocumentKind::Other);
    }

    #[test]
    fn new_document_is_waiting() {
        let doc = Document::from_descriptor(RawFileDescriptor::new("doc2.csv", 10));
        assert_eq!(doc.status, DocumentStatus::Waiting);
        assert_eq!(doc.progress, 0);
        assert_eq!(doc.kind, DocumentKind::Csv);
    }

    #[test]
    fn file_size_formatting() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5 GB");
    }

    #[test]
    fn kind_serializes_as_label() {
        let json = serde_json::to_string(&DocumentKind::Pdf).unwrap();
        assert_eq!(json, "\"PDF\"");
        let back: DocumentKind = serde_json::from_str("\"Excel\"").unwrap();
        assert_eq!(back, DocumentKind::Excel);
    }

    #[test]
    fn outcome_serializes_like_display() {
        for outcome in [Outcome::Success, Outcome::Partial, Outcome::Error] {
            let json = serde_json::to_string(&outcome).unwrap();
            assert_eq!(json, format!("\"{outcome}\""));
        }
    }

    #[test]
    fn search_text_contains_visible_fields() {
        let row = ResultRow {
            id: 3,
            document_id: DocumentId::new(),
            document: "invoice.pdf".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 12),
            counterparty: "OOO Romashka".into(),
            tax_id: "7700000002".into(),
            amount: 45000.0,
            vat: 7500.0,
            kind: DocumentKind::Pdf,
            outcome: Outcome::Partial,
            confidence: 80,
        };
        let text = row.search_text();
        assert!(text.contains("invoice.pdf"));
        assert!(text.contains("2024-01-12"));
        assert!(text.contains("45000.00"));
        assert!(text.contains("Partial"));
    }
}
