//! Parse command: run saved response bodies through the same pipeline.

use super::{process_responses, RunOutput};
use crate::config::Config;
use crate::store::CapturedResponse;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

/// Processes catalog responses saved on disk, without a browser.
pub struct ParseCommand {
    config: Config,
}

impl ParseCommand {
    /// Creates a new parse command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Reads each file as one response body and writes the usual outputs.
    pub fn execute(&self, files: &[PathBuf]) -> Result<RunOutput> {
        let mut responses = Vec::with_capacity(files.len());
        for path in files {
            debug!("Reading saved response: {}", path.display());
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read response file: {}", path.display()))?;
            responses.push(CapturedResponse::new(path.display().to_string(), 200, body));
        }

        process_responses(&self.config, &responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Locale;
    use tempfile::TempDir;

    const BODY: &str = r#"{"data":{"Catalog":{"searchStore":{"elements":[
        {"title":"Cheap","catalogNs":{"mappings":[{"pageSlug":"cheap"}]},
         "price":{"totalPrice":{"fmtPrice":{"originalPrice":"€5.00","discountPrice":"€4.00"}}}},
        {"title":"Deal","catalogNs":{"mappings":[{"pageSlug":"deal"}]},
         "price":{"totalPrice":{"fmtPrice":{"originalPrice":"€40.00","discountPrice":"€10.00"}}}}
    ]}}}}"#;

    fn make_test_config(dir: &TempDir) -> Config {
        let mut config = Config::new();
        config.xlsx_path = dir.path().join("out.xlsx");
        config.text_path = dir.path().join("out.txt");
        config
    }

    #[test]
    fn test_parse_saved_files() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("response-001.json");
        std::fs::write(&input, BODY).unwrap();

        let mut config = make_test_config(&dir);
        config.locale = Locale::Fr;

        let output = ParseCommand::new(config).execute(&[input]).unwrap();

        assert_eq!(output.records.len(), 2);
        assert_eq!(output.records[0].title.as_deref(), Some("Deal"));
        assert_eq!(output.records[0].savings, 30.0);
        assert_eq!(output.records[0].link, "https://store.epicgames.com/fr/p/deal");

        let text = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert!(text.starts_with("Title: Deal\n"));
    }

    #[test]
    fn test_parse_missing_file() {
        let dir = TempDir::new().unwrap();
        let cmd = ParseCommand::new(make_test_config(&dir));

        let err = cmd.execute(&[dir.path().join("nope.json")]).unwrap_err();
        assert!(err.to_string().contains("Failed to read response file"));
    }

    #[test]
    fn test_parse_invalid_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        std::fs::write(&good, BODY).unwrap();
        std::fs::write(&bad, "<html>Access denied</html>").unwrap();

        let output = ParseCommand::new(make_test_config(&dir)).execute(&[bad, good]).unwrap();
        assert_eq!(output.records.len(), 2);
    }
}
