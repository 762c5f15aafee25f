//! CLI command implementations.

pub mod parse;
pub mod scrape;

pub use parse::ParseCommand;
pub use scrape::ScrapeCommand;

use crate::config::Config;
use crate::export::ExportTargets;
use crate::format::Formatter;
use crate::store::{rank_by_savings, CapturedResponse, CatalogParser, CatalogRecord};
use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// What a command produced: the terminal rendering and the files it wrote.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub records: Vec<CatalogRecord>,
    pub rendered: String,
    pub files: Vec<PathBuf>,
}

/// Parses, ranks, exports and renders a set of captured responses.
pub(crate) fn process_responses(
    config: &Config,
    responses: &[CapturedResponse],
) -> Result<RunOutput> {
    let parser = CatalogParser::new(config.locale);
    let mut records = parser.parse_responses(responses);
    rank_by_savings(&mut records);

    info!("Collected {} records from {} response(s)", records.len(), responses.len());

    let files = ExportTargets::from_config(config).write_all(&records)?;
    let rendered = Formatter::new(config.format).format_records(&records);

    Ok(RunOutput { records, rendered, files })
}
