//! Field extraction and outcome classification.
//!
//! The pipeline treats extraction as a black box: an [`Extractor`] turns a
//! processed document into an [`Extraction`], and [`classify_outcome`] decides
//! how far the result can be trusted.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use smartparse_core::{Document, DocumentKind, Outcome, ResultRow};

/// Confidence at or above which a complete extraction counts as a success.
pub const SUCCESS_CONFIDENCE: u8 = 90;

/// Confidence at or above which an extraction is at least partially usable.
pub const PARTIAL_CONFIDENCE: u8 = 70;

/// Russian taxpayer id: 10 digits for organisations, 12 for individuals.
static TAX_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10}(\d{2})?$").unwrap());

/// Fields pulled out of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub date: Option<NaiveDate>,
    pub counterparty: String,
    pub tax_id: String,
    pub amount: f64,
    pub vat: f64,
    /// 0..=100
    pub confidence: u8,
}

impl Extraction {
    /// Nothing extracted; classifies as [`Outcome::Error`].
    pub fn empty() -> Self {
        Self {
            date: None,
            counterparty: String::new(),
            tax_id: String::new(),
            amount: 0.0,
            vat: 0.0,
            confidence: 0,
        }
    }

    pub fn into_row(self, id: u64, document: &Document) -> ResultRow {
        let outcome = classify_outcome(&self);
        ResultRow {
            id,
            document_id: document.id,
            document: document.name.clone(),
            date: self.date,
            counterparty: self.counterparty,
            tax_id: self.tax_id,
            amount: self.amount,
            vat: self.vat,
            kind: document.kind,
            outcome,
            confidence: self.confidence,
        }
    }
}

pub fn is_valid_tax_id(tax_id: &str) -> bool {
    TAX_ID_RE.is_match(tax_id)
}

/// Success needs high confidence and a well-formed tax id; Partial needs
/// moderate confidence; anything else is an Error.
pub fn classify_outcome(extraction: &Extraction) -> Outcome {
    if extraction.confidence >= SUCCESS_CONFIDENCE && is_valid_tax_id(&extraction.tax_id) {
        Outcome::Success
    } else if extraction.confidence >= PARTIAL_CONFIDENCE {
        Outcome::Partial
    } else {
        Outcome::Error
    }
}

/// Produces the fields for a completed document.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// `position` is the document's 0-based index in the run.
    async fn extract(&self, document: &Document, position: usize) -> anyhow::Result<Extraction>;
}

/// Deterministic stand-in values, derived from the document itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderExtractor;

const COUNTERPARTIES: [&str; 4] = ["OOO Romashka", "IP Ivanov", "AO Sberbank", "OOO Gazprom"];

impl PlaceholderExtractor {
    fn base_confidence(kind: DocumentKind) -> u8 {
        match kind {
            DocumentKind::Pdf => 96,
            DocumentKind::Excel | DocumentKind::Csv => 99,
            DocumentKind::Image => 82,
            DocumentKind::Other => 62,
        }
    }

    fn name_hash(name: &str) -> u64 {
        let mut h = DefaultHasher::new();
        name.hash(&mut h);
        h.finish()
    }
}

fn round_kopecks(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[async_trait]
impl Extractor for PlaceholderExtractor {
    async fn extract(&self, document: &Document, position: usize) -> anyhow::Result<Extraction> {
        let hash = Self::name_hash(&document.name);
        let amount = (hash % 10_000_000) as f64 / 100.0;
        // VAT at 20% is already included in the amount.
        let vat = round_kopecks(amount * 20.0 / 120.0);
        let jitter = ((hash >> 24) % 6) as u8;
        let base = NaiveDate::from_ymd_opt(2024, 1, 10)
            .ok_or_else(|| anyhow::anyhow!("invalid base date"))?;

        Ok(Extraction {
            date: base.checked_add_days(Days::new(position as u64)),
            counterparty: COUNTERPARTIES[position % COUNTERPARTIES.len()].to_string(),
            tax_id: format!("77{:08}", position + 1),
            amount,
            vat,
            confidence: Self::base_confidence(document.kind) - jitter,
        })
    }
}
