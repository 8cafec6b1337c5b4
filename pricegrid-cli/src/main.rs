//! pricegrid CLI: load the aligned price matrix and summarize it.
//!
//! Commands:
//! - `load`: resolve the start, fetch the universe and reference series, print a summary
//! - `universe`: list the symbols a configuration resolves to
//! - `config`: print the default configuration as TOML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pricegrid_core::data::{
    CircuitBreaker, CsvProvider, DataProvider, FetchProgress, SilentProgress, StdoutProgress,
    SyntheticProvider, YahooProvider,
};
use pricegrid_core::features::pct_change_column;
use pricegrid_core::{LoadedData, LoaderConfig, PriceLoader, StartSpec};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "pricegrid",
    about = "pricegrid: date-aligned closing prices for an equity universe"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the price matrix and print a summary.
    Load {
        /// Start: a date (YYYY-MM-DD) or a number of business days before the end date.
        #[arg(long)]
        start: String,

        /// Skip the rate index and market index.
        #[arg(long, default_value_t = false)]
        no_indices: bool,

        /// Path to a TOML loader config. Defaults to the built-in universe.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Market data source.
        #[arg(long, value_enum, default_value_t = ProviderKind::Yahoo)]
        provider: ProviderKind,

        /// Directory of <SYMBOL>.csv files (with --provider csv).
        #[arg(long, default_value = "data")]
        csv_dir: PathBuf,

        /// Print the summary as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the symbols in the universe.
    Universe {
        /// Path to a TOML loader config.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default configuration as TOML.
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderKind {
    Yahoo,
    Csv,
    Synthetic,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Load {
            start,
            no_indices,
            config,
            provider,
            csv_dir,
            json,
        } => run_load(&start, !no_indices, config.as_deref(), provider, csv_dir, json),
        Commands::Universe { config } => run_universe(config.as_deref()),
        Commands::Config => {
            print!("{}", LoaderConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<LoaderConfig> {
    match path {
        Some(p) => LoaderConfig::from_file(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(LoaderConfig::default()),
    }
}

fn build_provider(
    kind: ProviderKind,
    csv_dir: PathBuf,
    config: &LoaderConfig,
) -> Result<Box<dyn DataProvider>> {
    Ok(match kind {
        ProviderKind::Yahoo => {
            let breaker = Arc::new(CircuitBreaker::default_provider());
            Box::new(YahooProvider::new(breaker)?.with_adjusted_close(config.adjusted_close))
        }
        ProviderKind::Csv => Box::new(CsvProvider::new(csv_dir)),
        ProviderKind::Synthetic => Box::new(SyntheticProvider::new()),
    })
}

fn run_load(
    start: &str,
    include_indices: bool,
    config: Option<&Path>,
    provider: ProviderKind,
    csv_dir: PathBuf,
    json: bool,
) -> Result<()> {
    let start: StartSpec = start.parse()?;
    let config = load_config(config)?;
    let provider = build_provider(provider, csv_dir, &config)?;
    let loader = PriceLoader::new(config, provider)?;

    let progress: &dyn FetchProgress = if json { &SilentProgress } else { &StdoutProgress };
    let loaded = loader.get_data_with_progress(start, include_indices, progress)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary_json(&loader, &loaded))?);
    } else {
        print_summary(&loader, &loaded);
    }

    for failure in &loaded.failures {
        eprintln!("Error downloading {}", failure.symbol);
        eprintln!("  Error Message: {}", failure.error);
        eprintln!("  Error at: {}", failure.stage);
    }

    Ok(())
}

fn print_summary(loader: &PriceLoader, loaded: &LoadedData) {
    let table = &loaded.table;
    let cfg = loader.config();
    let fmt_date = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());

    println!("\nData Summary:");
    println!("Requested range: {} to {}", loaded.start, loaded.end);
    println!("Start Date: {}", fmt_date(table.first_date()));
    println!("End Date: {}", fmt_date(table.last_date()));
    println!("Number of trading days: {}", table.len());
    println!("Number of columns: {}", table.columns().len());
    println!("Fingerprint: {}", table.fingerprint());

    if table.has_column(&cfg.rate_index) {
        let feature = pct_change_column(&cfg.rate_index, cfg.pct_change_window);
        println!("\nRate index {} included", cfg.rate_index);
        println!(
            "{}-row percentage change column present: {}",
            cfg.pct_change_window,
            table.has_column(&feature)
        );
    }
    if table.has_column(&cfg.market_index) {
        println!("Market index {} included", cfg.market_index);
    }
    if !loaded.failures.is_empty() {
        println!(
            "\n{} of {} symbols failed: {}",
            loaded.failures.len(),
            loader.universe().len(),
            loaded.failed_symbols().join(", ")
        );
    }
}

fn summary_json(loader: &PriceLoader, loaded: &LoadedData) -> serde_json::Value {
    let table = &loaded.table;
    let cfg = loader.config();
    serde_json::json!({
        "provider": loader.provider_name(),
        "requested_start": loaded.start,
        "requested_end": loaded.end,
        "first_date": table.first_date(),
        "last_date": table.last_date(),
        "trading_days": table.len(),
        "columns": table.columns(),
        "rate_index_included": table.has_column(&cfg.rate_index),
        "market_index_included": table.has_column(&cfg.market_index),
        "fingerprint": table.fingerprint(),
        "failures": loaded
            .failures
            .iter()
            .map(|f| serde_json::json!({
                "symbol": f.symbol,
                "stage": f.stage.to_string(),
                "error": f.error.to_string(),
            }))
            .collect::<Vec<_>>(),
    })
}

fn run_universe(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?.trimmed();
    let universe = config.validate()?;
    println!("{} symbols (end date {}):", universe.len(), config.end_date);
    for symbol in universe.iter() {
        println!("  {symbol}");
    }
    println!("Reference series: {}, {}", config.rate_index, config.market_index);
    Ok(())
}
