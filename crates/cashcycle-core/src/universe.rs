//! Ticker universe resolution.
//!
//! A [`TickerSource`] names where the symbols of a batch run come from: an
//! inline list, a local file, or the S&P 500 constituents table on
//! Wikipedia. [`TickerSource::resolve`] turns any of them into a validated,
//! de-duplicated symbol list in source order.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

use crate::http_client::{HttpClient, HttpError, HttpRequest};
use crate::provider_policy::ProviderPolicy;
use crate::retry::with_retry;
use crate::Symbol;

/// Raw wikitext of the "List of S&P 500 companies" article.
pub const SP500_WIKITEXT_URL: &str =
    "https://en.wikipedia.org/w/index.php?title=List_of_S%26P_500_companies&action=raw";

const SYMBOL_TEMPLATE_PATTERN: &str =
    r"\{\{\s*(?:[A-Za-z]+Symbol|[A-Za-z]+ link)\s*\|\s*([A-Za-z][A-Za-z0-9.\-]*)\s*(?:\||\}\})";

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("failed to read ticker file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse ticker file '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("ticker file '{path}' has no Symbol or Ticker column")]
    MissingSymbolColumn { path: PathBuf },

    #[error("failed to fetch the S&P 500 list: {0}")]
    Fetch(HttpError),

    #[error("S&P 500 constituents table not found in the page")]
    ConstituentsNotFound,

    #[error("invalid ticker pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("ticker universe is empty")]
    Empty,
}

/// Where the tickers of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerSource {
    Symbols(Vec<String>),
    /// One symbol per line (`#` starts a comment), or CSV with a
    /// `Symbol`/`Ticker` header column.
    File(PathBuf),
    Sp500,
}

impl TickerSource {
    /// Resolves the source into valid, unique symbols, keeping first occurrences.
    ///
    /// Entries that are not valid symbols are logged and skipped. `limit`
    /// truncates the list after de-duplication.
    pub async fn resolve(
        &self,
        http_client: &dyn HttpClient,
        limit: Option<usize>,
    ) -> Result<Vec<Symbol>, UniverseError> {
        let raw = match self {
            Self::Symbols(symbols) => symbols.clone(),
            Self::File(path) => read_ticker_file(path)?,
            Self::Sp500 => fetch_sp500(http_client).await?,
        };

        let symbols = normalize(raw, limit);
        if symbols.is_empty() {
            return Err(UniverseError::Empty);
        }
        tracing::info!(count = symbols.len(), "resolved ticker universe");
        Ok(symbols)
    }
}

fn normalize(raw: Vec<String>, limit: Option<usize>) -> Vec<Symbol> {
    let mut seen = HashSet::new();
    let mut symbols = Vec::new();

    for entry in raw {
        match Symbol::parse(&entry) {
            Ok(symbol) => {
                if seen.insert(symbol.clone()) {
                    symbols.push(symbol);
                }
            }
            Err(error) => tracing::warn!(entry = %entry, "skipping ticker: {error}"),
        }
        if limit.is_some_and(|limit| symbols.len() >= limit) {
            break;
        }
    }

    symbols
}

/// Reads tickers from a plain-text list or a CSV file with a header.
pub fn read_ticker_file(path: &Path) -> Result<Vec<String>, UniverseError> {
    let contents = fs::read_to_string(path).map_err(|source| UniverseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let first_line = contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .unwrap_or_default();

    if first_line.contains(',') || is_symbol_header(first_line) {
        read_csv_tickers(path, &contents)
    } else {
        Ok(read_plain_tickers(&contents))
    }
}

fn is_symbol_header(cell: &str) -> bool {
    let cell = cell.trim().trim_matches('"');
    cell.eq_ignore_ascii_case("symbol") || cell.eq_ignore_ascii_case("ticker")
}

fn read_plain_tickers(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

fn read_csv_tickers(path: &Path, contents: &str) -> Result<Vec<String>, UniverseError> {
    let csv_error = |source| UniverseError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let column = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .position(is_symbol_header)
        .ok_or_else(|| UniverseError::MissingSymbolColumn {
            path: path.to_path_buf(),
        })?;

    let mut tickers = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if let Some(value) = record.get(column).filter(|value| !value.is_empty()) {
            tickers.push(value.to_owned());
        }
    }
    Ok(tickers)
}

async fn fetch_sp500(http_client: &dyn HttpClient) -> Result<Vec<String>, UniverseError> {
    let policy = ProviderPolicy::wikipedia_default();
    let retry = &policy.retry;

    let body = with_retry(retry, policy.provider, move |_| async move {
        let response = http_client
            .execute(HttpRequest::get(SP500_WIKITEXT_URL).with_timeout_ms(10_000))
            .await?;
        if response.is_success() {
            Ok(response.body)
        } else if retry.should_retry_status(response.status) {
            Err(HttpError::new(format!("status {}", response.status)))
        } else {
            Err(HttpError::non_retryable(format!("status {}", response.status)))
        }
    })
    .await
    .map_err(UniverseError::Fetch)?;

    parse_sp500_wikitext(&body)
}

/// Extracts ticker symbols from the constituents table of the S&P 500 article.
///
/// Only the first table is read; later tables list historical changes.
pub fn parse_sp500_wikitext(wikitext: &str) -> Result<Vec<String>, UniverseError> {
    let table = wikitext
        .find("id=\"constituents\"")
        .or_else(|| wikitext.find("{|"))
        .and_then(|start| {
            let rest = &wikitext[start..];
            rest.find("\n|}").map(|end| &rest[..end])
        })
        .ok_or(UniverseError::ConstituentsNotFound)?;

    let pattern = Regex::new(SYMBOL_TEMPLATE_PATTERN)?;
    let symbols = pattern
        .captures_iter(table)
        .filter_map(|captures| captures.get(1))
        .map(|symbol| symbol.as_str().to_owned())
        .collect::<Vec<_>>();

    if symbols.is_empty() {
        return Err(UniverseError::ConstituentsNotFound);
    }
    Ok(symbols)
}
