//! Activity journal: a reporter decorator that remembers what it forwarded.
//!
//! Keeps a bounded, newest-first activity log and the last reported overall
//! progress so both can be read back and reset by `clear_all`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use smartparse_core::{Document, LogEntry, Reporter, Section, Severity};

pub const LOG_CLEARED_MESSAGE: &str = "Log cleared. System ready.";

#[derive(Debug)]
struct JournalState {
    entries: VecDeque<LogEntry>,
    overall: u8,
    phase: u8,
}

pub struct Journal {
    inner: Arc<dyn Reporter>,
    capacity: usize,
    state: Mutex<JournalState>,
}

impl Journal {
    pub fn new(inner: Arc<dyn Reporter>, capacity: usize) -> Self {
        Self {
            inner,
            capacity: capacity.max(1),
            state: Mutex::new(JournalState {
                entries: VecDeque::new(),
                overall: 0,
                phase: 1,
            }),
        }
    }

    /// Log entries, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().entries.iter().cloned().collect()
    }

    /// Last reported `(overall, phase)`.
    pub fn progress(&self) -> (u8, u8) {
        let state = self.lock();
        (state.overall, state.phase)
    }

    /// Drop every entry and leave a single "ready" line.
    pub fn clear_log(&self) {
        self.lock().entries.clear();
        self.on_log(LOG_CLEARED_MESSAGE, Severity::Success);
    }

    /// Back to 0% and phase 1.
    pub fn reset_progress(&self) {
        self.on_progress(0, 1);
    }

    fn lock(&self) -> MutexGuard<'_, JournalState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Reporter for Journal {
    fn on_progress(&self, overall: u8, phase: u8) {
        {
            let mut state = self.lock();
            state.overall = overall;
            state.phase = phase;
        }
        self.inner.on_progress(overall, phase);
    }

    fn on_file_progress(&self, document: &Document) {
        self.inner.on_file_progress(document);
    }

    fn on_log(&self, message: &str, severity: Severity) {
        {
            let mut state = self.lock();
            state.entries.push_front(LogEntry::new(message, severity));
            state.entries.truncate(self.capacity);
        }
        self.inner.on_log(message, severity);
    }

    fn on_notify(&self, message: &str, severity: Severity) {
        self.inner.on_notify(message, severity);
    }

    fn on_section(&self, section: Section) {
        self.inner.on_section(section);
    }
}
