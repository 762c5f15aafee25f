//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::store::capture::DEFAULT_OPERATION;
use crate::store::locale::Locale;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store locale used for the browse page and product links
    #[serde(default)]
    pub locale: Locale,

    /// Browse page query
    #[serde(default)]
    pub browse: BrowseQuery,

    /// GraphQL operation whose responses are captured
    #[serde(default = "default_operation")]
    pub operation: String,

    /// Fixed wait after navigation before capture may end
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Quiet period after the last catalog response that ends capture
    #[serde(default = "default_idle_ms")]
    pub idle_ms: u64,

    /// Hard limit on the capture phase
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Limit on waiting for the page load event
    #[serde(default = "default_nav_timeout_ms")]
    pub nav_timeout_ms: u64,

    /// Scroll the page while waiting to trigger lazy loading
    #[serde(default = "default_true")]
    pub scroll: bool,

    /// Delay between scroll steps
    #[serde(default = "default_scroll_interval_ms")]
    pub scroll_interval_ms: u64,

    /// Run Chromium without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Wait for Enter on stdin instead of the idle rule
    #[serde(default)]
    pub interactive: bool,

    /// Explicit Chromium binary
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Spreadsheet output
    #[serde(default = "default_xlsx_path")]
    pub xlsx_path: PathBuf,

    /// Plain text output
    #[serde(default = "default_text_path")]
    pub text_path: PathBuf,

    /// Directory receiving the raw captured bodies
    #[serde(default)]
    pub dump_dir: Option<PathBuf>,

    /// Terminal output format
    #[serde(default)]
    pub format: OutputFormat,
}

/// Query string of the store browse page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseQuery {
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_dir")]
    pub sort_dir: String,
    /// The store's own (misspelled) tier name for discounted items
    #[serde(default = "default_price_tier")]
    pub price_tier: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub start: u32,
}

fn default_operation() -> String {
    DEFAULT_OPERATION.to_string()
}

fn default_settle_ms() -> u64 {
    10_000
}

fn default_idle_ms() -> u64 {
    3_000
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_nav_timeout_ms() -> u64 {
    30_000
}

fn default_scroll_interval_ms() -> u64 {
    1_500
}

fn default_true() -> bool {
    true
}

fn default_xlsx_path() -> PathBuf {
    PathBuf::from("results_sorted.xlsx")
}

fn default_text_path() -> PathBuf {
    PathBuf::from("results-2.txt")
}

fn default_sort_by() -> String {
    "releaseDate".to_string()
}

fn default_sort_dir() -> String {
    "DESC".to_string()
}

fn default_price_tier() -> String {
    "tierDiscouted".to_string()
}

fn default_category() -> String {
    "Game".to_string()
}

fn default_count() -> u32 {
    40
}

impl Default for BrowseQuery {
    fn default() -> Self {
        Self {
            sort_by: default_sort_by(),
            sort_dir: default_sort_dir(),
            price_tier: default_price_tier(),
            category: default_category(),
            count: default_count(),
            start: 0,
        }
    }
}

impl BrowseQuery {
    /// Renders the query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        format!(
            "sortBy={}&sortDir={}&priceTier={}&category={}&count={}&start={}",
            urlencoding::encode(&self.sort_by),
            urlencoding::encode(&self.sort_dir),
            urlencoding::encode(&self.price_tier),
            urlencoding::encode(&self.category),
            self.count,
            self.start
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Locale::EnUs,
            browse: BrowseQuery::default(),
            operation: default_operation(),
            settle_ms: default_settle_ms(),
            idle_ms: default_idle_ms(),
            timeout_ms: default_timeout_ms(),
            nav_timeout_ms: default_nav_timeout_ms(),
            scroll: true,
            scroll_interval_ms: default_scroll_interval_ms(),
            headless: true,
            interactive: false,
            chrome_path: None,
            xlsx_path: default_xlsx_path(),
            text_path: default_text_path(),
            dump_dir: None,
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("egs-deals").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(locale) = std::env::var("EGS_LOCALE") {
            if let Ok(l) = locale.parse() {
                self.locale = l;
            }
        }

        if let Ok(path) = std::env::var("EGS_CHROME_PATH") {
            if !path.is_empty() {
                self.chrome_path = Some(PathBuf::from(path));
            }
        }

        if let Ok(settle) = std::env::var("EGS_SETTLE_MS") {
            if let Ok(ms) = settle.parse() {
                self.settle_ms = ms;
            }
        }

        if let Ok(timeout) = std::env::var("EGS_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                self.timeout_ms = ms;
            }
        }

        self
    }

    /// Full URL of the browse page to load.
    pub fn browse_url(&self) -> String {
        format!("{}/browse?{}", self.locale.base_url(), self.browse.to_query_string())
    }
}

/// Output format for the terminal summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
