//! `smartparse-core`: data model, errors, and the reporter contract shared by
//! every SmartParse crate.

pub mod error;
pub mod event;
pub mod traits;
pub mod types;

pub use error::{Result, SmartParseError};
pub use event::{LogEntry, ReportEvent, Section, Severity};
pub use traits::{CollectingReporter, NullReporter, Reporter};
pub use types::{
    format_file_size, Document, DocumentId, DocumentKind, DocumentStatus, Outcome,
    RawFileDescriptor, ResultRow, Stage,
};
