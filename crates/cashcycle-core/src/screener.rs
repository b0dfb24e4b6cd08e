//! Batch screening over a ticker universe.
//!
//! The [`Screener`] walks the symbols in order, fetches one
//! [`StatementSnapshot`](crate::StatementSnapshot) per ticker, runs the ratio
//! engine and sorts each ticker into either a result row or a skip record.
//! One ticker's failure never stops the run.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::data_source::{FundamentalsSource, SourceError};
use crate::domain::report_date;
use crate::{compute_metrics, MetricResult, ReportingPeriod, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenOptions {
    pub period: ReportingPeriod,
    /// Keep rows whose metrics are only partly defined instead of skipping them.
    pub include_partial: bool,
}

/// One result row: a ticker's metrics for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMetrics {
    pub symbol: Symbol,
    pub period: ReportingPeriod,
    #[serde(with = "report_date::option")]
    pub fiscal_date_ending: Option<Date>,
    pub reported_currency: Option<String>,
    #[serde(flatten)]
    pub metrics: MetricResult,
}

/// Why a ticker produced no row.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FetchFailed(SourceError),
    /// Figures that were missing or non-numeric upstream.
    MissingData(Vec<&'static str>),
    UndefinedMetrics,
}

impl SkipReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FetchFailed(error) => error.kind().as_str(),
            Self::MissingData(_) => "missing_data",
            Self::UndefinedMetrics => "undefined_metrics",
        }
    }

    pub fn retryable(&self) -> bool {
        matches!(self, Self::FetchFailed(error) if error.retryable())
    }
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchFailed(error) => write!(f, "fetch failed: {error}"),
            Self::MissingData(fields) => write!(f, "missing data: {}", fields.join(", ")),
            Self::UndefinedMetrics => f.write_str("metrics undefined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTicker {
    pub symbol: Symbol,
    pub reason: SkipReason,
}

/// Outcome of one screening run, rows in input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScreenReport {
    pub rows: Vec<TickerMetrics>,
    pub skipped: Vec<SkippedTicker>,
}

impl ScreenReport {
    pub fn processed(&self) -> usize {
        self.rows.len() + self.skipped.len()
    }
}

#[derive(Debug, Clone)]
pub struct Screener<S> {
    source: S,
    options: ScreenOptions,
}

impl<S: FundamentalsSource> Screener<S> {
    pub fn new(source: S, options: ScreenOptions) -> Self {
        Self { source, options }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches and computes one ticker without applying the skip policy.
    ///
    /// Missing figures surface as undefined metrics.
    pub async fn evaluate(&self, symbol: &Symbol) -> Result<TickerMetrics, SourceError> {
        let snapshot = self.source.snapshot(symbol, self.options.period).await?;

        Ok(TickerMetrics {
            metrics: compute_metrics(&snapshot.figures),
            symbol: snapshot.symbol,
            period: snapshot.period,
            fiscal_date_ending: snapshot.fiscal_date_ending,
            reported_currency: snapshot.reported_currency,
        })
    }

    /// Screens `symbols` in order.
    ///
    /// A ticker is skipped when its statements cannot be fetched, when any
    /// figure is missing, or (unless `include_partial`) when any metric is
    /// undefined.
    pub async fn run(&self, symbols: &[Symbol]) -> ScreenReport {
        let mut report = ScreenReport::default();

        for (index, symbol) in symbols.iter().enumerate() {
            tracing::info!(%symbol, position = index + 1, total = symbols.len(), "processing");

            match self.screen_one(symbol).await {
                Ok(row) => report.rows.push(row),
                Err(reason) => {
                    tracing::warn!(%symbol, code = reason.code(), "skipping: {reason}");
                    report.skipped.push(SkippedTicker {
                        symbol: symbol.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            rows = report.rows.len(),
            skipped = report.skipped.len(),
            "screening finished"
        );
        report
    }

    async fn screen_one(&self, symbol: &Symbol) -> Result<TickerMetrics, SkipReason> {
        let snapshot = self
            .source
            .snapshot(symbol, self.options.period)
            .await
            .map_err(SkipReason::FetchFailed)?;

        if !snapshot.figures.is_complete() {
            return Err(SkipReason::MissingData(snapshot.figures.missing_fields()));
        }

        let metrics = compute_metrics(&snapshot.figures);
        let keep = if self.options.include_partial {
            !metrics.is_undefined()
        } else {
            metrics.is_complete()
        };
        if !keep {
            return Err(SkipReason::UndefinedMetrics);
        }

        Ok(TickerMetrics {
            symbol: snapshot.symbol,
            period: snapshot.period,
            fiscal_date_ending: snapshot.fiscal_date_ending,
            reported_currency: snapshot.reported_currency,
            metrics,
        })
    }
}
