use std::sync::{Mutex, MutexGuard};

use crate::event::{ReportEvent, Section, Severity};
use crate::types::Document;

/// Sink for everything the pipeline wants the user to see.
///
/// Implemented by the presentation layer. Calls are fire-and-forget and must not block.
pub trait Reporter: Send + Sync {
    /// Overall run progress (0..=100) and the coarse phase number (1..=5).
    fn on_progress(&self, overall: u8, phase: u8);

    /// A document's status or progress changed.
    fn on_file_progress(&self, document: &Document);

    /// Append a line to the processing log.
    fn on_log(&self, message: &str, severity: Severity);

    /// Show a transient notification.
    fn on_notify(&self, message: &str, severity: Severity);

    /// Ask the presentation layer to switch views.
    fn on_section(&self, _section: Section) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn on_progress(&self, _overall: u8, _phase: u8) {}
    fn on_file_progress(&self, _document: &Document) {}
    fn on_log(&self, _message: &str, _severity: Severity) {}
    fn on_notify(&self, _message: &str, _severity: Severity) {}
}

/// Records every call as a [`ReportEvent`], in order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.lock().clone()
    }

    /// Messages of all `on_log` calls.
    pub fn logs(&self) -> Vec<(String, Severity)> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Log { message, severity } => Some((message.clone(), *severity)),
                _ => None,
            })
            .collect()
    }

    /// Messages of all `on_notify` calls.
    pub fn notifications(&self) -> Vec<(String, Severity)> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Notify { message, severity } => Some((message.clone(), *severity)),
                _ => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<(u8, u8)> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Progress { overall, phase } => Some((*overall, *phase)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, event: ReportEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ReportEvent>> {
        // A poisoned log is still a usable log.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Reporter for CollectingReporter {
    fn on_progress(&self, overall: u8, phase: u8) {
        self.push(ReportEvent::Progress { overall, phase });
    }

    fn on_file_progress(&self, document: &Document) {
        self.push(ReportEvent::FileProgress {
            document: document.clone(),
        });
    }

    fn on_log(&self, message: &str, severity: Severity) {
        self.push(ReportEvent::Log {
            message: message.to_string(),
            severity,
        });
    }

    fn on_notify(&self, message: &str, severity: Severity) {
        self.push(ReportEvent::Notify {
            message: message.to_string(),
            severity,
        });
    }

    fn on_section(&self, section: Section) {
        self.push(ReportEvent::Section { section });
    }
}
