//! Result rows of the last completed run.

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;
use smartparse_core::ResultRow;

/// Aggregate figures over the current result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub count: usize,
    pub total_amount: f64,
    pub distinct_counterparties: usize,
    pub estimated_seconds: u64,
}

impl Stats {
    pub fn estimated_processing_time(&self) -> Duration {
        Duration::from_secs(self.estimated_seconds)
    }
}

#[derive(Debug)]
pub struct ResultStore {
    rows: Vec<ResultRow>,
    per_document_seconds: u64,
}

impl ResultStore {
    pub fn new(per_document_seconds: u64) -> Self {
        Self {
            rows: Vec::new(),
            per_document_seconds,
        }
    }

    pub fn set_all(&mut self, rows: Vec<ResultRow>) {
        self.rows = rows;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn all(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn search(&self, query: &str) -> Vec<ResultRow> {
        filter_rows(&self.rows, query)
    }

    pub fn stats(&self) -> Stats {
        let counterparties: HashSet<&str> = self
            .rows
            .iter()
            .map(|r| r.counterparty.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        Stats {
            count: self.rows.len(),
            total_amount: self.rows.iter().map(|r| r.amount).sum(),
            distinct_counterparties: counterparties.len(),
            estimated_seconds: self.rows.len() as u64 * self.per_document_seconds,
        }
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new(smartparse_config::defaults::DEFAULT_PER_DOCUMENT_SECONDS)
    }
}

/// Case-insensitive substring match over each row's visible fields.
/// Order is preserved; an empty query keeps every row.
pub fn filter_rows(rows: &[ResultRow], query: &str) -> Vec<ResultRow> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|r| r.search_text().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
