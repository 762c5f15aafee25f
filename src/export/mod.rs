//! Result files written at the end of a run.

pub mod text;
pub mod xlsx;

use crate::config::Config;
use crate::store::CatalogRecord;
use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

pub use text::{render_text, write_text};
pub use xlsx::write_xlsx;

/// The spreadsheet and text report destinations of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTargets {
    pub xlsx: PathBuf,
    pub text: PathBuf,
}

impl ExportTargets {
    pub fn new(xlsx: impl Into<PathBuf>, text: impl Into<PathBuf>) -> Self {
        Self { xlsx: xlsx.into(), text: text.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.xlsx_path.clone(), config.text_path.clone())
    }

    /// Writes both files and returns their paths.
    pub fn write_all(&self, records: &[CatalogRecord]) -> Result<Vec<PathBuf>> {
        write_xlsx(records, &self.xlsx)?;
        info!("Spreadsheet written: {}", self.xlsx.display());

        write_text(records, &self.text)?;
        info!("Text report written: {}", self.text.display());

        Ok(vec![self.xlsx.clone(), self.text.clone()])
    }
}
