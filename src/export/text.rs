//! Plain text report: five labelled lines per record and a separator.

use crate::store::CatalogRecord;
use anyhow::{Context, Result};
use std::path::Path;

const SEPARATOR_WIDTH: usize = 40;

/// Renders the records in the order given.
pub fn render_text(records: &[CatalogRecord]) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut lines = Vec::with_capacity(records.len() * 6 + 1);

    for record in records {
        lines.push(format!("Title: {}", record.title_or_empty()));
        lines.push(format!("Original Price: {}", record.original_price));
        lines.push(format!("Discount Price: {}", record.discount_price));
        lines.push(format!("Savings: {}", format_savings(record.savings)));
        lines.push(format!("Link: {}", record.link));
        lines.push(separator.clone());
    }

    if lines.is_empty() {
        return String::new();
    }
    lines.push(String::new());

    lines.join("\n")
}

/// Writes [`render_text`] output to `path` as UTF-8.
pub fn write_text(records: &[CatalogRecord], path: &Path) -> Result<()> {
    std::fs::write(path, render_text(records))
        .with_context(|| format!("Failed to write text report: {}", path.display()))
}

/// Shortest representation that still shows a decimal point (`150.0`, `12.35`).
pub fn format_savings(savings: f64) -> String {
    format!("{:?}", savings)
}
