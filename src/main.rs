//! egs-deals - Rank discounted Epic Games Store listings by savings.

use anyhow::Result;
use clap::{Parser, Subcommand};
use egs_deals::commands::{ParseCommand, RunOutput, ScrapeCommand};
use egs_deals::config::{Config, OutputFormat};
use egs_deals::store::Locale;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "egs-deals",
    version,
    about = "Rank discounted Epic Games Store listings by savings",
    long_about = "Loads the Epic Games Store browse page in Chromium, captures the catalog \
                  GraphQL responses it requests, and writes the deals sorted by savings to a \
                  spreadsheet and a text report."
)]
struct Cli {
    /// Store locale (e.g. en-US, de, pt-BR)
    #[arg(short, long, global = true)]
    locale: Option<Locale>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Terminal output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Spreadsheet output path
    #[arg(long, global = true)]
    xlsx: Option<PathBuf>,

    /// Text report output path
    #[arg(long, global = true)]
    txt: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the browse page and capture its catalog responses (default)
    #[command(alias = "s")]
    Scrape(ScrapeArgs),

    /// Process response bodies saved with --dump-dir
    #[command(alias = "p")]
    Parse {
        /// Saved response bodies
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List supported store locales
    Locales,
}

#[derive(clap::Args, Default)]
struct ScrapeArgs {
    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Wait for Enter before finishing instead of detecting idle
    #[arg(short, long)]
    interactive: bool,

    /// Do not scroll the page while waiting
    #[arg(long)]
    no_scroll: bool,

    /// Fixed wait after navigation in milliseconds
    #[arg(long, env = "EGS_SETTLE_MS")]
    settle_ms: Option<u64>,

    /// Quiet period ending the capture in milliseconds
    #[arg(long)]
    idle_ms: Option<u64>,

    /// Upper bound on the capture phase in milliseconds
    #[arg(long, env = "EGS_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Chromium binary
    #[arg(long, env = "EGS_CHROME_PATH")]
    chrome: Option<PathBuf>,

    /// Save raw captured bodies to this directory
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Number of listings requested per page
    #[arg(long)]
    count: Option<u32>,

    /// Listing offset
    #[arg(long)]
    start: Option<u32>,

    /// Store category filter
    #[arg(long)]
    category: Option<String>,
}

impl ScrapeArgs {
    fn apply(self, config: &mut Config) {
        if self.headed {
            config.headless = false;
        }
        if self.interactive {
            config.interactive = true;
        }
        if self.no_scroll {
            config.scroll = false;
        }
        if let Some(ms) = self.settle_ms {
            config.settle_ms = ms;
        }
        if let Some(ms) = self.idle_ms {
            config.idle_ms = ms;
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = ms;
        }
        if let Some(path) = self.chrome {
            config.chrome_path = Some(path);
        }
        if let Some(dir) = self.dump_dir {
            config.dump_dir = Some(dir);
        }
        if let Some(count) = self.count {
            config.browse.count = count;
        }
        if let Some(start) = self.start {
            config.browse.start = start;
        }
        if let Some(category) = self.category {
            config.browse.category = category;
        }
    }
}

fn print_output(output: &RunOutput) {
    println!("{}", output.rendered);
    for file in &output.files {
        eprintln!("Wrote {}", file.display());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(path) = cli.xlsx {
        config.xlsx_path = path;
    }
    if let Some(path) = cli.txt {
        config.text_path = path;
    }

    match cli.command.unwrap_or(Commands::Scrape(ScrapeArgs::default())) {
        Commands::Scrape(args) => {
            args.apply(&mut config);
            let output = ScrapeCommand::new(config).execute().await?;
            print_output(&output);
        }

        Commands::Parse { files } => {
            let output = ParseCommand::new(config).execute(&files)?;
            print_output(&output);
        }

        Commands::Locales => {
            println!("Supported store locales:\n");
            println!("{:<8} {:<20} {}", "Code", "Language", "Store");
            println!("{:-<8} {:-<20} {:-<40}", "", "", "");

            for locale in Locale::all() {
                println!("{:<8} {:<20} {}", locale.code(), locale.language(), locale.base_url());
            }
        }
    }

    Ok(())
}
