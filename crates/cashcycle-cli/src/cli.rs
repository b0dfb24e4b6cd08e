//! CLI argument definitions for cashcycle.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `compute` | Run the ratio engine on figures given as flags |
//! | `metrics` | Fetch statements and compute metrics per symbol |
//! | `screen` | Batch-screen a ticker universe and export CSV |
//! | `prices` | Fetch a daily price series |
//! | `universe` | List the tickers a selection resolves to |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json, csv) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings and errors as failures |
//! | `--period` | `annual` | Reporting period (annual, quarterly) |
//! | `--api-key` | env | Alpha Vantage API key |
//! | `--timeout-ms` | env or `5000` | Request timeout in ms |
//! | `-v` | off | Log verbosity, repeatable |
//!
//! # Examples
//!
//! ```bash
//! cashcycle compute --revenue 1000 --cogs 600 --receivables 200 --inventory 150 --payables 100
//! cashcycle metrics IBM AAPL --period quarterly
//! cashcycle screen --sp500 --limit 20 --output ccc.csv -v
//! cashcycle prices IBM --limit 5 --format json --pretty
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use cashcycle_core::{ReportingPeriod, DEFAULT_EXPORT_FILE};

/// Working-capital ratios (DPO, DIO, DSO, CCC) from Alpha Vantage statements.
#[derive(Debug, Parser)]
#[command(
    name = "cashcycle",
    author,
    version,
    about = "Working-capital ratio screener",
    long_about = "cashcycle fetches balance sheets and income statements from Alpha Vantage \
and computes days payable outstanding, days inventory outstanding, days sales outstanding \
and the cash conversion cycle.\n\
\n\
The API key is read from --api-key, CASHCYCLE_ALPHAVANTAGE_API_KEY or ALPHAVANTAGE_API_KEY \
(a .env file is honoured). Without one the 'demo' key is used, which only serves IBM."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Reporting period whose latest report is used.
    #[arg(long, global = true, default_value_t = ReportingPeriod::Annual)]
    pub period: ReportingPeriod,

    /// Alpha Vantage API key; overrides the environment.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in milliseconds; overrides the environment.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// Single JSON envelope.
    Json,
    /// Comma-separated rows with a header.
    Csv,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute metrics from figures given on the command line.
    ///
    /// Omitted figures count as missing. No network access.
    ///
    ///   cashcycle compute --revenue 1000 --cogs 600 --receivables 200 --inventory 150 --payables 100
    Compute(ComputeArgs),

    /// Fetch the latest statements and compute metrics for each symbol.
    ///
    /// Undefined metrics are shown as N/A.
    ///
    ///   cashcycle metrics IBM
    ///   cashcycle metrics AAPL MSFT --period quarterly
    Metrics(MetricsArgs),

    /// Screen a ticker universe and write the complete rows to CSV.
    ///
    /// Tickers with missing figures or undefined metrics are skipped.
    ///
    ///   cashcycle screen --sp500
    ///   cashcycle screen --symbols IBM,AAPL --output ccc.csv
    Screen(ScreenArgs),

    /// Fetch the most recent daily prices for a symbol.
    ///
    ///   cashcycle prices IBM --limit 10
    Prices(PricesArgs),

    /// List the tickers a selection resolves to.
    ///
    ///   cashcycle universe --sp500 --limit 25
    Universe(UniverseArgs),
}

#[derive(Debug, Args)]
pub struct ComputeArgs {
    /// Total revenue.
    #[arg(long, allow_hyphen_values = true)]
    pub revenue: Option<f64>,

    /// Cost of goods sold (cost of revenue).
    #[arg(long, allow_hyphen_values = true)]
    pub cogs: Option<f64>,

    /// Accounts receivable.
    #[arg(long, allow_hyphen_values = true)]
    pub receivables: Option<f64>,

    /// Inventory.
    #[arg(long, allow_hyphen_values = true)]
    pub inventory: Option<f64>,

    /// Accounts payable.
    #[arg(long, allow_hyphen_values = true)]
    pub payables: Option<f64>,
}

#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// One or more ticker symbols.
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,
}

/// Where the tickers come from; exactly one is required.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct TickerSelection {
    /// Comma-separated symbols.
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// File with one symbol per line, or CSV with a Symbol column.
    #[arg(long)]
    pub tickers_file: Option<PathBuf>,

    /// Current S&P 500 constituents from Wikipedia.
    #[arg(long)]
    pub sp500: bool,
}

#[derive(Debug, Args)]
pub struct ScreenArgs {
    #[command(flatten)]
    pub tickers: TickerSelection,

    /// Process at most this many tickers.
    #[arg(long)]
    pub limit: Option<usize>,

    /// CSV file to write.
    #[arg(long, default_value = DEFAULT_EXPORT_FILE)]
    pub output: PathBuf,

    /// Keep tickers whose metrics are only partly defined.
    #[arg(long, default_value_t = false)]
    pub include_partial: bool,
}

#[derive(Debug, Args)]
pub struct PricesArgs {
    /// Ticker symbol.
    pub symbol: String,

    /// Number of most recent trading days.
    #[arg(long, default_value_t = 30)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct UniverseArgs {
    #[command(flatten)]
    pub tickers: TickerSelection,

    /// List at most this many tickers.
    #[arg(long)]
    pub limit: Option<usize>,
}
