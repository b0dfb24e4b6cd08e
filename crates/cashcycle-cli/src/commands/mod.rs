mod compute;
mod metrics;
mod prices;
mod screen;
mod universe;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use cashcycle_core::{
    AlphaVantageAdapter, AlphaVantageConfig, Envelope, EnvelopeError, EnvelopeMeta,
    FinancialSnapshot, HttpClient, MetricResult, PriceSeries, ReqwestHttpClient, ScreenOptions,
    Screener, SkippedTicker, Symbol, TickerMetrics, TickerSource,
};

use crate::cli::{Cli, Command, TickerSelection};
use crate::error::CliError;

/// Command payload carried in the envelope's `data` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandData {
    Compute {
        input: FinancialSnapshot,
        metrics: MetricResult,
    },
    Metrics {
        rows: Vec<TickerMetrics>,
    },
    Screen {
        rows: Vec<TickerMetrics>,
        skipped: Vec<SkippedRow>,
        output: PathBuf,
    },
    Prices {
        series: Option<PriceSeries>,
    },
    Universe {
        count: usize,
        symbols: Vec<Symbol>,
    },
}

/// Serializable view of a skipped ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub symbol: Symbol,
    pub code: String,
    pub reason: String,
}

impl From<&SkippedTicker> for SkippedRow {
    fn from(skipped: &SkippedTicker) -> Self {
        Self {
            symbol: skipped.symbol.clone(),
            code: skipped.reason.code().to_owned(),
            reason: skipped.reason.to_string(),
        }
    }
}

pub struct CommandResult {
    pub data: CommandData,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub source: String,
}

impl CommandResult {
    pub fn ok(data: CommandData, source: impl Into<String>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            source: source.into(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<CommandData>, CliError> {
    let started = Instant::now();
    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

    let command_result = match &cli.command {
        Command::Compute(args) => compute::run(args),
        Command::Metrics(args) => {
            let (screener, config) = build_screener(cli, http_client, false)?;
            with_demo_warning(metrics::run(args, &screener).await?, &config)
        }
        Command::Screen(args) => {
            let (screener, config) =
                build_screener(cli, http_client.clone(), args.include_partial)?;
            let tickers = ticker_source(&args.tickers);
            with_demo_warning(
                screen::run(args, &tickers, &screener, http_client.as_ref()).await?,
                &config,
            )
        }
        Command::Prices(args) => {
            let (screener, config) = build_screener(cli, http_client, false)?;
            with_demo_warning(prices::run(args, screener.source()).await?, &config)
        }
        Command::Universe(args) => {
            let tickers = ticker_source(&args.tickers);
            universe::run(args, &tickers, http_client.as_ref()).await?
        }
    };

    let CommandResult {
        data,
        warnings,
        errors,
        source,
    } = command_result;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut meta = EnvelopeMeta::new(source, latency_ms)?;
    for warning in warnings {
        meta.push_warning(warning);
    }

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

/// Environment config with command-line overrides applied.
pub fn alphavantage_config(cli: &Cli) -> Result<AlphaVantageConfig, CliError> {
    let mut config = AlphaVantageConfig::from_env()?;

    if let Some(api_key) = cli.api_key.as_deref().map(str::trim) {
        if api_key.is_empty() {
            return Err(CliError::Command(String::from("--api-key cannot be empty")));
        }
        config = config.with_api_key(api_key);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        if timeout_ms == 0 {
            return Err(CliError::Command(String::from(
                "--timeout-ms must be greater than zero",
            )));
        }
        config = config.with_timeout_ms(timeout_ms);
    }

    Ok(config)
}

fn build_screener(
    cli: &Cli,
    http_client: Arc<dyn HttpClient>,
    include_partial: bool,
) -> Result<(Screener<AlphaVantageAdapter>, AlphaVantageConfig), CliError> {
    let config = alphavantage_config(cli)?;
    let adapter = AlphaVantageAdapter::with_http_client(http_client, config.clone());
    let options = ScreenOptions {
        period: cli.period,
        include_partial,
    };
    Ok((Screener::new(adapter, options), config))
}

fn with_demo_warning(result: CommandResult, config: &AlphaVantageConfig) -> CommandResult {
    if config.uses_demo_key() {
        result.with_warning("using the Alpha Vantage 'demo' key, which only serves IBM")
    } else {
        result
    }
}

pub fn ticker_source(selection: &TickerSelection) -> TickerSource {
    if selection.sp500 {
        TickerSource::Sp500
    } else if let Some(path) = &selection.tickers_file {
        TickerSource::File(path.clone())
    } else {
        TickerSource::Symbols(selection.symbols.clone())
    }
}

/// Envelope `source` label for a ticker selection.
pub fn ticker_source_label(source: &TickerSource) -> &'static str {
    match source {
        TickerSource::Symbols(_) => "inline",
        TickerSource::File(_) => "file",
        TickerSource::Sp500 => "wikipedia",
    }
}

pub fn parse_symbols(raw: &[String]) -> Result<Vec<Symbol>, CliError> {
    raw.iter()
        .map(|value| Symbol::parse(value).map_err(CliError::from))
        .collect()
}
