use thiserror::Error;

use crate::event::Severity;

/// Top-level error type for the SmartParse pipeline.
#[derive(Debug, Error)]
pub enum SmartParseError {
    #[error("no documents queued for processing")]
    EmptyQueue,

    #[error("no results to export")]
    NothingToExport,

    #[error("stage '{stage}' failed for {document}: {reason}")]
    StageFailure {
        document: String,
        stage: String,
        reason: String,
    },

    #[error("run failed: {0}")]
    RunFailure(String),

    #[error("run cancelled")]
    Cancelled,

    #[error("unsupported export format: '{0}'")]
    UnsupportedFormat(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SmartParseError {
    /// Severity used when this error is surfaced to the user.
    ///
    /// Recoverable user mistakes are warnings; everything else is an error.
    pub fn severity(&self) -> Severity {
        match self {
            SmartParseError::EmptyQueue
            | SmartParseError::NothingToExport
            | SmartParseError::Cancelled
            | SmartParseError::UnsupportedFormat(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

pub type Result<T, E = SmartParseError> = std::result::Result<T, E>;
