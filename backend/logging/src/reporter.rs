//! Tracing-backed reporter.
//!
//! Maps reporter calls onto `tracing` events so a headless process still
//! records everything the pipeline tells the user.

use smartparse_core::{Document, Reporter, Section, Severity};
use tracing::{debug, error, info, warn};

/// Forwards every reporter call to `tracing` under the `smartparse::report` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for TracingReporter {
    fn on_progress(&self, overall: u8, phase: u8) {
        info!(target: "smartparse::report", overall, phase, "Run progress");
    }

    fn on_file_progress(&self, document: &Document) {
        debug!(
            target: "smartparse::report",
            document = %document.name,
            status = %document.status,
            progress = document.progress,
            "Document progress"
        );
    }

    fn on_log(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => {
                info!(target: "smartparse::report", severity = %severity, "{message}")
            }
            Severity::Warning => warn!(target: "smartparse::report", "{message}"),
            Severity::Error => error!(target: "smartparse::report", "{message}"),
        }
    }

    fn on_notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => {
                info!(target: "smartparse::notify", severity = %severity, "{message}")
            }
            Severity::Warning => warn!(target: "smartparse::notify", "{message}"),
            Severity::Error => error!(target: "smartparse::notify", "{message}"),
        }
    }

    fn on_section(&self, section: Section) {
        debug!(target: "smartparse::report", section = ?section, "Section change");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartparse_core::RawFileDescriptor;

    #[test]
    fn accepts_every_call_without_subscriber() {
        let reporter = TracingReporter::new();
        let doc = Document::from_descriptor(RawFileDescriptor::new("doc1.pdf", 1024));
        reporter.on_progress(50, 3);
        reporter.on_file_progress(&doc);
        reporter.on_log("doc1.pdf: Loading file", Severity::Info);
        reporter.on_notify("Export failed", Severity::Error);
        reporter.on_section(Section::Results);
    }
}
