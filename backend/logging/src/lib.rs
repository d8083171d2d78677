//! Structured logging for SmartParse.
//!
//! Console + rolling JSON file output, and a `Reporter` that forwards pipeline
//! events into `tracing`.

pub mod logger;
pub mod reporter;

pub use logger::init_logger;
pub use reporter::TracingReporter;
