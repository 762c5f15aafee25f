//! Terminal output for ranked records (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::store::CatalogRecord;

/// Formats records for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the ranked records.
    pub fn format_records(&self, records: &[CatalogRecord]) -> String {
        if records.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No deals found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_records(records),
            OutputFormat::Table => self.table_records(records),
            OutputFormat::Markdown => self.markdown_records(records),
            OutputFormat::Csv => self.csv_records(records),
        }
    }

    // JSON formatting

    fn json_records(&self, records: &[CatalogRecord]) -> String {
        serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_records(&self, records: &[CatalogRecord]) -> String {
        let savings_width = 10;
        let price_width = 14;
        let off_width = 4;
        let title_width = 50;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:>savings_width$}  {:>price_width$}  {:>price_width$}  {:>off_width$}  {}",
            "Savings", "Now", "Was", "Off", "Title"
        ));
        lines.push(format!(
            "{:-<savings_width$}  {:-<price_width$}  {:-<price_width$}  {:-<off_width$}  {:-<title_width$}",
            "", "", "", "", ""
        ));

        for record in records {
            let off = record.discount_percent().map(|p| format!("{}%", p)).unwrap_or_default();

            lines.push(format!(
                "{:>savings_width$.2}  {:>price_width$}  {:>price_width$}  {:>off_width$}  {}",
                record.savings,
                display_price(&record.discount_price),
                display_price(&record.original_price),
                off,
                truncate(record.title_or_empty(), title_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} deals", records.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_records(&self, records: &[CatalogRecord]) -> String {
        let mut lines = Vec::new();

        lines.push("| Savings | Price | Was | Title |".to_string());
        lines.push("|--------:|------:|----:|-------|".to_string());

        for record in records {
            let title = truncate(record.title_or_empty(), 40).replace('|', "\\|");
            let title = if record.has_link() {
                format!("[{}]({})", title, record.link)
            } else {
                title
            };

            lines.push(format!(
                "| {:.2} | {} | {} | {} |",
                record.savings,
                display_price(&record.discount_price),
                display_price(&record.original_price),
                title
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} deals found*", records.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "title,original_price,discount_price,savings,link".to_string()
    }

    fn csv_records(&self, records: &[CatalogRecord]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for record in records {
            lines.push(format!(
                "{},{},{},{},{}",
                Self::csv_escape(record.title_or_empty()),
                Self::csv_escape(&record.original_price),
                Self::csv_escape(&record.discount_price),
                record.savings,
                Self::csv_escape(&record.link)
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// Store prices use a non-breaking space after the currency code.
fn display_price(raw: &str) -> String {
    raw.replace('\u{a0}', " ")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::NO_LINK;

    fn make_record() -> CatalogRecord {
        CatalogRecord::new(
            Some("Game A".to_string()),
            "NOK\u{a0}299.00",
            "NOK\u{a0}149.00",
            "https://store.epicgames.com/en-US/p/game-a",
        )
    }

    fn make_unlinked_record() -> CatalogRecord {
        CatalogRecord::new(None, "0", "0", NO_LINK)
    }

    fn make_long_title_record() -> CatalogRecord {
        CatalogRecord::new(
            Some("A Very Long Game Title: Definitive Ultimate Edition With Every Expansion".into()),
            "$59.99",
            "$19.79",
            "https://store.epicgames.com/en-US/p/long",
        )
    }

    // JSON format tests

    #[test]
    fn test_json_records() {
        let formatter = Formatter::new(OutputFormat::Json);
        let output = formatter.format_records(&[make_record(), make_unlinked_record()]);

        assert!(output.starts_with('['));
        assert!(output.ends_with(']'));
        assert!(output.contains("Game A"));
        assert!(output.contains("150.0"));
        assert!(output.contains("\"title\": null"));
        assert!(output.contains(NO_LINK));
    }

    #[test]
    fn test_json_empty() {
        let formatter = Formatter::new(OutputFormat::Json);
        assert_eq!(formatter.format_records(&[]), "[]");
    }

    // Table format tests

    #[test]
    fn test_table_records() {
        let formatter = Formatter::new(OutputFormat::Table);
        let output = formatter.format_records(&[make_record(), make_unlinked_record()]);

        assert!(output.contains("Savings"));
        assert!(output.contains("Title"));
        assert!(output.contains("150.00"));
        assert!(output.contains("NOK 149.00"));
        assert!(output.contains("NOK 299.00"));
        assert!(output.contains("50%"));
        assert!(output.contains("Game A"));
        assert!(output.contains("Total: 2 deals"));
        assert!(!output.contains('\u{a0}'));
    }

    #[test]
    fn test_table_truncates_long_titles() {
        let formatter = Formatter::new(OutputFormat::Table);
        let output = formatter.format_records(&[make_long_title_record()]);

        assert!(output.contains("..."));
        assert!(!output.contains("Every Expansion"));
    }

    #[test]
    fn test_table_empty() {
        let formatter = Formatter::new(OutputFormat::Table);
        assert_eq!(formatter.format_records(&[]), "No deals found.");
    }

    // Markdown format tests

    #[test]
    fn test_markdown_records() {
        let formatter = Formatter::new(OutputFormat::Markdown);
        let output = formatter.format_records(&[make_record(), make_unlinked_record()]);

        assert!(output.starts_with("| Savings | Price | Was | Title |"));
        assert!(output.contains("| 150.00 | NOK 149.00 | NOK 299.00 | [Game A](https://store.epicgames.com/en-US/p/game-a) |"));
        assert!(output.contains("| 0.00 | 0 | 0 |  |"));
        assert!(output.contains("*2 deals found*"));
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let formatter = Formatter::new(OutputFormat::Markdown);
        let record = CatalogRecord::new(Some("A | B".into()), "0", "0", NO_LINK);
        let output = formatter.format_records(&[record]);
        assert!(output.contains("A \\| B"));
    }

    // CSV format tests

    #[test]
    fn test_csv_records() {
        let formatter = Formatter::new(OutputFormat::Csv);
        let output = formatter.format_records(&[make_record(), make_unlinked_record()]);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "title,original_price,discount_price,savings,link");
        assert!(lines[1].starts_with("Game A,"));
        assert!(lines[1].ends_with(",150,https://store.epicgames.com/en-US/p/game-a"));
        assert_eq!(lines[2], ",0,0,0,No link");
    }

    #[test]
    fn test_csv_escaping() {
        let formatter = Formatter::new(OutputFormat::Csv);
        let record = CatalogRecord::new(
            Some("Hello, \"World\"".into()),
            "$1,299.00",
            "$999.00",
            "https://x",
        );
        let output = formatter.format_records(&[record]);

        assert!(output.contains("\"Hello, \"\"World\"\"\""));
        assert!(output.contains("\"$1,299.00\""));
        assert!(output.contains(",300,"));
    }

    #[test]
    fn test_csv_empty() {
        let formatter = Formatter::new(OutputFormat::Csv);
        assert_eq!(
            formatter.format_records(&[]),
            "title,original_price,discount_price,savings,link"
        );
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let title = "日本語のタイトル".repeat(10);
        let out = truncate(&title, 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with("..."));
    }
}
