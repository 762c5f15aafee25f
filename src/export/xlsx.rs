//! Spreadsheet export.

use crate::store::CatalogRecord;
use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

/// Column headers, in output order.
pub const HEADERS: [&str; 5] = ["Title", "Original Price", "Discount Price", "Savings", "Link"];

/// Writes one row per record under a bold header row.
pub fn write_xlsx(records: &[CatalogRecord], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    fill_sheet(worksheet, records).context("Failed to build worksheet")?;

    workbook
        .save(path)
        .with_context(|| format!("Failed to write spreadsheet: {}", path.display()))
}

fn fill_sheet(sheet: &mut Worksheet, records: &[CatalogRecord]) -> Result<(), XlsxError> {
    let bold = Format::new().set_bold();

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;

        // A missing title stays an empty cell.
        if let Some(title) = &record.title {
            sheet.write_string(row, 0, title)?;
        }
        sheet.write_string(row, 1, &record.original_price)?;
        sheet.write_string(row, 2, &record.discount_price)?;
        sheet.write_number(row, 3, record.savings)?;
        sheet.write_string(row, 4, &record.link)?;
    }

    Ok(())
}
