//! SmartParse configuration schema.
//!
//! Every field is optional on disk; [`crate::apply_all_defaults`] fills the gaps
//! and the accessor methods fall back to the same defaults.

use serde::{Deserialize, Serialize};
use smartparse_core::Stage;
use std::path::PathBuf;

use crate::defaults::{
    default_export_formats, default_stages, DEFAULT_ACTIVITY_CAPACITY, DEFAULT_EXPORT_DELAY_MS,
    DEFAULT_LOG_LEVEL, DEFAULT_PER_DOCUMENT_SECONDS, DEFAULT_RESULTS_VIEW_DELAY_MS,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for SmartParse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartParseConfig {
    /// Stage sequence and run timing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PipelineConfig>,

    /// Export formats and behaviour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Ordered stages applied to every document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<Stage>>,
    /// Pause before the results view is requested after a run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_view_delay_ms: Option<u64>,
    /// Per-document figure behind the processing time estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_document_seconds: Option<u64>,
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Accepted formats; an empty list accepts anything
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
    /// Where the CLI writes artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>, // "trace" | "debug" | "info" | "warn" | "error"
    /// Directory for rolling JSON log files; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Number of entries kept in the activity log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_capacity: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved accessors
// ---------------------------------------------------------------------------

impl SmartParseConfig {
    pub fn stages(&self) -> Vec<Stage> {
        self.pipeline
            .as_ref()
            .and_then(|p| p.stages.clone())
            .unwrap_or_else(default_stages)
    }

    pub fn results_view_delay_ms(&self) -> u64 {
        self.pipeline
            .as_ref()
            .and_then(|p| p.results_view_delay_ms)
            .unwrap_or(DEFAULT_RESULTS_VIEW_DELAY_MS)
    }

    pub fn per_document_seconds(&self) -> u64 {
        self.pipeline
            .as_ref()
            .and_then(|p| p.per_document_seconds)
            .unwrap_or(DEFAULT_PER_DOCUMENT_SECONDS)
    }

    pub fn export_formats(&self) -> Vec<String> {
        self.export
            .as_ref()
            .and_then(|e| e.formats.clone())
            .unwrap_or_else(default_export_formats)
    }

    pub fn export_delay_ms(&self) -> u64 {
        self.export
            .as_ref()
            .and_then(|e| e.delay_ms)
            .unwrap_or(DEFAULT_EXPORT_DELAY_MS)
    }

    pub fn export_output_dir(&self) -> Option<PathBuf> {
        self.export.as_ref().and_then(|e| e.output_dir.clone())
    }

    pub fn log_level(&self) -> String {
        self.logging
            .as_ref()
            .and_then(|l| l.level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.logging.as_ref().and_then(|l| l.dir.clone())
    }

    pub fn activity_capacity(&self) -> usize {
        self.logging
            .as_ref()
            .and_then(|l| l.activity_capacity)
            .unwrap_or(DEFAULT_ACTIVITY_CAPACITY)
    }

    /// Zero every delay. Used by headless callers that want instant runs.
    pub fn without_delays(mut self) -> Self {
        let stages = self
            .stages()
            .into_iter()
            .map(|s| Stage::new(s.name, 0))
            .collect();
        let pipeline = self.pipeline.get_or_insert_with(PipelineConfig::default);
        pipeline.stages = Some(stages);
        pipeline.results_view_delay_ms = Some(0);
        self.export.get_or_insert_with(ExportConfig::default).delay_ms = Some(0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
pipeline:
  stages:
    - name: Loading file
      durationMs: 10
  perDocumentSeconds: 3
export:
  formats: [json]
  delayMs: 0
logging:
  level: debug
  activityCapacity: 5
"#;
        let cfg: SmartParseConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.stages(), vec![Stage::new("Loading file", 10)]);
        assert_eq!(cfg.per_document_seconds(), 3);
        assert_eq!(cfg.export_formats(), vec!["json".to_string()]);
        assert_eq!(cfg.log_level(), "debug");
        assert_eq!(cfg.activity_capacity(), 5);
        assert_eq!(cfg.results_view_delay_ms(), DEFAULT_RESULTS_VIEW_DELAY_MS);
    }

    #[test]
    fn empty_config_resolves_to_defaults() {
        let cfg = SmartParseConfig::default();
        assert_eq!(cfg.stages().len(), 5);
        assert_eq!(cfg.per_document_seconds(), 2);
        assert_eq!(cfg.export_delay_ms(), 1500);
        assert!(cfg.log_dir().is_none());
    }

    #[test]
    fn without_delays_keeps_stage_names() {
        let cfg = SmartParseConfig::default().without_delays();
        let stages = cfg.stages();
        assert_eq!(stages.len(), 5);
        assert!(stages.iter().all(|s| s.duration_ms == 0));
        assert_eq!(stages[0].name, "Loading file");
        assert_eq!(cfg.export_delay_ms(), 0);
    }
}
