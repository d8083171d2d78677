//! Config validation: schema checks with user-friendly error messages.

use crate::schema::SmartParseConfig;
use thiserror::Error;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &SmartParseConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_pipeline(config, &mut report);
    validate_export(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_pipeline(config: &SmartParseConfig, report: &mut ValidationReport) {
    let Some(pipeline) = &config.pipeline else { return };
    let Some(stages) = &pipeline.stages else { return };
    if stages.is_empty() {
        report.error("pipeline.stages", "At least one stage is required");
    }
    for (i, stage) in stages.iter().enumerate() {
        if stage.name.trim().is_empty() {
            report.error(format!("pipeline.stages[{i}].name"), "Stage name cannot be empty");
        }
        if stage.duration_ms == 0 {
            report.warn(
                format!("pipeline.stages[{i}].durationMs"),
                "Zero duration; progress will jump straight through this stage",
            );
        }
    }
}

fn validate_export(config: &SmartParseConfig, report: &mut ValidationReport) {
    let Some(export) = &config.export else { return };
    let Some(formats) = &export.formats else { return };
    for (i, format) in formats.iter().enumerate() {
        if format.trim().is_empty() {
            report.error(format!("export.formats[{i}]"), "Export format cannot be empty");
        }
    }
    if formats.is_empty() {
        report.warn("export.formats", "Empty format list accepts any export format");
    }
}

fn validate_logging(config: &SmartParseConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            report.error(
                "logging.level",
                format!("Unknown log level '{level}'. Use one of {}", LOG_LEVELS.join(", ")),
            );
        }
    }
    if logging.activity_capacity == Some(0) {
        report.error("logging.activityCapacity", "activityCapacity must be >= 1");
    }
}
