//! Config defaults: applies sensible default values to parsed config.

use smartparse_core::Stage;

use crate::schema::{ExportConfig, LoggingConfig, PipelineConfig, SmartParseConfig};

/// Pause before asking the presentation layer to show results.
pub const DEFAULT_RESULTS_VIEW_DELAY_MS: u64 = 1_000;

/// Seconds per document used by the processing time estimate.
pub const DEFAULT_PER_DOCUMENT_SECONDS: u64 = 2;

/// Simulated export preparation time.
pub const DEFAULT_EXPORT_DELAY_MS: u64 = 1_500;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Entries kept in the activity log.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 20;

/// The five-step extraction sequence.
pub fn default_stages() -> Vec<Stage> {
    vec![
        Stage::new("Loading file", 500),
        Stage::new("Detecting format", 800),
        Stage::new("Extracting text", 1_200),
        Stage::new("Parsing data", 1_500),
        Stage::new("Normalizing", 1_000),
    ]
}

pub fn default_export_formats() -> Vec<String> {
    ["json", "csv", "xlsx"].iter().map(|s| s.to_string()).collect()
}

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: SmartParseConfig) -> SmartParseConfig {
    let config = apply_pipeline_defaults(config);
    let config = apply_export_defaults(config);
    apply_logging_defaults(config)
}

fn apply_pipeline_defaults(mut config: SmartParseConfig) -> SmartParseConfig {
    let pipeline = config.pipeline.get_or_insert_with(PipelineConfig::default);
    if pipeline.stages.is_none() {
        pipeline.stages = Some(default_stages());
    }
    if pipeline.results_view_delay_ms.is_none() {
        pipeline.results_view_delay_ms = Some(DEFAULT_RESULTS_VIEW_DELAY_MS);
    }
    if pipeline.per_document_seconds.is_none() {
        pipeline.per_document_seconds = Some(DEFAULT_PER_DOCUMENT_SECONDS);
    }
    config
}

fn apply_export_defaults(mut config: SmartParseConfig) -> SmartParseConfig {
    let export = config.export.get_or_insert_with(ExportConfig::default);
    if export.formats.is_none() {
        export.formats = Some(default_export_formats());
    }
    if export.delay_ms.is_none() {
        export.delay_ms = Some(DEFAULT_EXPORT_DELAY_MS);
    }
    config
}

fn apply_logging_defaults(mut config: SmartParseConfig) -> SmartParseConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.activity_capacity.is_none() {
        logging.activity_capacity = Some(DEFAULT_ACTIVITY_CAPACITY);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_default_stages() {
        let cfg = apply_all_defaults(SmartParseConfig::default());
        let stages = cfg.pipeline.unwrap().stages.unwrap();
        assert_eq!(stages.len(), 5);
        assert_eq!(stages[3], Stage::new("Parsing data", 1_500));
    }

    #[test]
    fn applies_logging_level() {
        let cfg = apply_all_defaults(SmartParseConfig::default());
        assert_eq!(cfg.logging.unwrap().level.unwrap(), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn does_not_override_user_set_formats() {
        let mut cfg = SmartParseConfig::default();
        cfg.export = Some(ExportConfig {
            formats: Some(vec!["csv".to_string()]),
            ..Default::default()
        });
        let cfg = apply_all_defaults(cfg);
        let export = cfg.export.unwrap();
        assert_eq!(export.formats.unwrap(), vec!["csv".to_string()]);
        assert_eq!(export.delay_ms.unwrap(), DEFAULT_EXPORT_DELAY_MS);
    }
}
