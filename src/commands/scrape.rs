//! Scrape command: load the browse page and capture its catalog queries.

use super::{process_responses, RunOutput};
use crate::config::Config;
use crate::store::{BrowserCapture, CapturedResponse, CatalogSource};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Executes a capture run against the live store.
pub struct ScrapeCommand {
    config: Config,
}

impl ScrapeCommand {
    /// Creates a new scrape command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Launches Chromium, captures, and writes the results.
    pub async fn execute(&self) -> Result<RunOutput> {
        let source = BrowserCapture::new(&self.config);
        self.execute_with_source(&source).await
    }

    /// Runs the capture with a provided source (for testing).
    pub async fn execute_with_source(&self, source: &impl CatalogSource) -> Result<RunOutput> {
        let url = self.config.browse_url();
        info!("Capturing {} responses from {}", self.config.operation, url);

        let responses = source.capture(&url).await.context("Catalog capture failed")?;

        if responses.is_empty() {
            warn!(
                "No {} response was captured; the output files will be empty",
                self.config.operation
            );
        }

        if let Some(dir) = &self.config.dump_dir {
            let written = dump_responses(dir, &responses)?;
            info!("Saved {} raw response(s) to {}", written.len(), dir.display());
        }

        process_responses(&self.config, &responses)
    }
}

/// Saves each body as `response-NNN.json` so it can be re-parsed later.
pub fn dump_responses(dir: &Path, responses: &[CapturedResponse]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create dump directory: {}", dir.display()))?;

    let mut written = Vec::with_capacity(responses.len());
    for (index, response) in responses.iter().enumerate() {
        let path = dir.join(format!("response-{:03}.json", index + 1));
        std::fs::write(&path, &response.body)
            .with_context(|| format!("Failed to save response: {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}
