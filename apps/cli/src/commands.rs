//! CLI command definitions, routing, and tracing setup.

use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use wikiloot_core::{BatchOptions, ProgressReporter, run_batch, save_outcome};
use wikiloot_crawler::HttpFetcher;
use wikiloot_discovery::{discover_items, load_input};
use wikiloot_extract::{ExtractOptions, ExtractionMode};
use wikiloot_shared::{AppConfig, FetchConfig, init_config, load_config};
use wikiloot_storage::{
    RetryPrompt, read_items, read_known_urls, write_catalog, write_with_retry,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// wikiloot: item metadata from bg3.wiki.
#[derive(Parser)]
#[command(
    name = "wikiloot",
    version,
    about = "Scrape item rarity, weight, price, and description from bg3.wiki into CSV tables.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Enrich an item table with data scraped from each item's page.
    Parse {
        /// Input item table (CSV).
        input: PathBuf,

        /// Output item table (CSV).
        output: PathBuf,

        /// Accept items whose page has no description.
        #[arg(long)]
        empty_desc: bool,

        /// Error table path (defaults to the configured file next to the output).
        #[arg(long)]
        errors: Option<PathBuf>,

        /// Extract properties only, without descriptions or shared-variation detection.
        #[arg(long)]
        legacy: bool,

        /// Per-request timeout in seconds (overrides config).
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Collect item pages linked from listing pages into a catalog.
    Discover {
        /// Discovery input document (JSON).
        input: PathBuf,

        /// Output catalog (CSV).
        output: PathBuf,

        /// Table of already-known items; its `url` column is excluded.
        #[arg(long)]
        known: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "wikiloot=info",
        1 => "wikiloot=debug",
        _ => "wikiloot=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Parse {
            input,
            output,
            empty_desc,
            errors,
            legacy,
            timeout,
        } => {
            let args = ParseArgs {
                input,
                output,
                empty_desc,
                errors,
                legacy,
                timeout,
            };
            cmd_parse(args).await
        }
        Command::Discover {
            input,
            output,
            known,
        } => cmd_discover(&input, &output, known.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

struct ParseArgs {
    input: PathBuf,
    output: PathBuf,
    empty_desc: bool,
    errors: Option<PathBuf>,
    legacy: bool,
    timeout: Option<u64>,
}

async fn cmd_parse(args: ParseArgs) -> Result<()> {
    let config = load_config()?;
    let fetcher = HttpFetcher::new(&fetch_config(&config, args.timeout))?;

    let options = BatchOptions {
        extract: ExtractOptions {
            mode: if args.legacy {
                ExtractionMode::Legacy
            } else {
                ExtractionMode::Full
            },
            allow_empty_description: args.empty_desc || config.parse.allow_empty_description,
        },
    };
    let errors_path = args
        .errors
        .unwrap_or_else(|| default_errors_path(&args.output, &config.output.errors_file));

    let records = read_items(&args.input)?;
    info!(
        input = %args.input.display(),
        rows = records.len(),
        "parsing item table"
    );

    let reporter = CliProgress::new();
    let outcome = run_batch(records, &fetcher, &options, &reporter).await;

    save_outcome(&outcome, &args.output, &errors_path, &StdinPrompt)?;

    println!();
    if outcome.ledger.is_empty() {
        println!("  All {} items parsed without errors.", outcome.rows.len());
    } else {
        println!("The following errors occurred during parsing:");
        print!("{}", outcome.ledger);
    }
    println!();
    println!("  Enriched: {}", outcome.enriched().count());
    println!("  Failed:   {}", outcome.failed().count());
    println!("  Output:   {}", args.output.display());
    println!("  Errors:   {}", errors_path.display());
    println!();

    Ok(())
}

async fn cmd_discover(input: &Path, output: &Path, known: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    let fetcher = HttpFetcher::new(&fetch_config(&config, None))?;

    let document = load_input(input)?;
    let known_urls = match known {
        Some(path) => read_known_urls(path)?,
        None => HashSet::new(),
    };

    info!(
        seeds = document.input_urls.len(),
        curated = document.missing_items.len(),
        known = known_urls.len(),
        "discovering items"
    );

    let outcome = discover_items(&document, &known_urls, &fetcher).await;
    write_with_retry(output, &StdinPrompt, || write_catalog(output, &outcome.catalog))?;

    println!();
    println!("  New items: {}", outcome.catalog.len());
    println!("  Catalog:   {}", output.display());
    if !outcome.errors.is_empty() {
        println!("  Seeds that could not be read:");
        for error in &outcome.errors {
            println!("\t{error}");
        }
    }
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

/// Runtime fetch settings: config values with the CLI timeout applied on top.
fn fetch_config(config: &AppConfig, timeout_secs: Option<u64>) -> FetchConfig {
    let mut fetch = FetchConfig::from(config);
    if let Some(secs) = timeout_secs {
        fetch.timeout = Duration::from_secs(secs);
    }
    fetch
}

/// `file_name` in the same directory as `output`.
fn default_errors_path(output: &Path, file_name: &str) -> PathBuf {
    match output.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

// ---------------------------------------------------------------------------
// Terminal collaborators
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif percentage bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{msg:<16} [{bar:40.cyan/blue}] {pos:>3}%")
                .unwrap()
                .progress_chars("=> "),
        );
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn percent(&self, value: u8) {
        self.bar.set_position(u64::from(value));
    }

    fn row_failed(&self, name: &str, errors: &[String]) {
        self.bar
            .set_message(format!("{} error(s): {name}", errors.len()));
    }

    fn done(&self, _enriched: usize, _failed: usize) {
        self.bar.finish_and_clear();
    }
}

/// Blocks on stdin until the user has closed the locked file.
struct StdinPrompt;

impl RetryPrompt for StdinPrompt {
    fn acknowledge_locked(&self, path: &Path) {
        eprint!(
            "Permission Error with '{}'\nClose it and press Enter to try again: ",
            path.display()
        );
        if let Err(e) = std::io::stderr().flush() {
            warn!(error = %e, "could not flush prompt");
        }
        wait_for_enter(&mut std::io::stdin().lock());
    }
}

/// Read one line from `input`. Returns `false`, after logging, when no
/// acknowledgment could be read; the retry still goes ahead.
fn wait_for_enter(input: &mut impl BufRead) -> bool {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => {
            warn!("stdin closed, retrying without acknowledgment");
            false
        }
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "could not read acknowledgment, retrying anyway");
            false
        }
    }
}
