//! Terminal rendering of result rows and run figures.

use smartparse_core::{Outcome, ResultRow};
use smartparse_pipeline::{RunSummary, Stats};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

/// Colour is on unless `NO_COLOR` is set or the terminal is dumb.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false)
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn visible_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(visible_width(cell)));
    match align {
        Align::Left => format!("{cell}{fill}"),
        Align::Right => format!("{fill}{cell}"),
    }
}

fn outcome_cell(outcome: Outcome, color: bool) -> String {
    if !color {
        return outcome.to_string();
    }
    let code = match outcome {
        Outcome::Success => GREEN,
        Outcome::Partial => YELLOW,
        Outcome::Error => RED,
    };
    format!("{code}{outcome}{RESET}")
}

const COLUMNS: [(&str, Align); 9] = [
    ("#", Align::Right),
    ("Document", Align::Left),
    ("Date", Align::Left),
    ("Counterparty", Align::Left),
    ("Tax ID", Align::Left),
    ("Amount", Align::Right),
    ("VAT", Align::Right),
    ("Type", Align::Left),
    ("Status", Align::Left),
];

/// One line per row under a header and a dashed separator.
pub fn render_results(rows: &[ResultRow], color: bool) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.document.clone(),
                r.date.map(|d| d.to_string()).unwrap_or_default(),
                r.counterparty.clone(),
                r.tax_id.clone(),
                format!("{:.2}", r.amount),
                format!("{:.2}", r.vat),
                r.kind.to_string(),
                outcome_cell(r.outcome, color),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = COLUMNS.iter().map(|(h, _)| h.len()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(visible_width(cell));
        }
    }

    let mut out = String::new();
    let header: Vec<String> = COLUMNS
        .iter()
        .zip(&widths)
        .map(|((h, align), w)| pad(h, *w, *align))
        .collect();
    if color {
        out.push_str(&format!("{BOLD}  {}  {RESET}\n", header.join("  ")));
    } else {
        out.push_str(&format!("  {}  \n", header.join("  ")));
    }
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}  \n", sep.join("  ")));

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(COLUMNS.iter().zip(&widths))
            .map(|(cell, ((_, align), w))| pad(cell, *w, *align))
            .collect();
        out.push_str(&format!("  {}  \n", line.join("  ")));
    }
    out
}

pub fn render_summary(summary: &RunSummary, stats: &Stats) -> String {
    format!(
        "Processed {} documents ({} failed) in {:.1}s\n\
         Total amount: {:.2}  Counterparties: {}  Estimated processing time: {}s\n",
        summary.documents,
        summary.failed,
        summary.elapsed.as_secs_f64(),
        stats.total_amount,
        stats.distinct_counterparties,
        stats.estimated_seconds,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use smartparse_core::{DocumentId, DocumentKind};

    fn row(document: &str, outcome: Outcome) -> ResultRow {
        ResultRow {
            id: 1,
            document_id: DocumentId::new(),
            document: document.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10),
            counterparty: "IP Ivanov".to_string(),
            tax_id: "7700000001".to_string(),
            amount: 1234.5,
            vat: 205.75,
            kind: DocumentKind::Pdf,
            outcome,
            confidence: 93,
        }
    }

    #[test]
    fn strips_ansi() {
        assert_eq!(strip_ansi(&format!("{GREEN}Success{RESET}")), "Success");
    }

    #[test]
    fn renders_aligned_table() {
        let out = render_results(&[row("invoice.pdf", Outcome::Success)], false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Counterparty"));
        assert!(lines[1].trim_start().starts_with('-'));
        assert!(lines[2].contains("invoice.pdf"));
        assert!(lines[2].contains("1234.50"));
        assert_eq!(lines[0].chars().count(), lines[2].chars().count());
    }

    #[test]
    fn colored_cells_keep_alignment() {
        let out = render_results(
            &[row("a.pdf", Outcome::Error), row("b.pdf", Outcome::Partial)],
            true,
        );
        let widths: Vec<usize> = out.lines().skip(2).map(visible_width).collect();
        assert_eq!(widths[0], widths[1]);
    }
}
