//! Statement source trait and its request/response types.
//!
//! A [`FundamentalsSource`] binds one entity's balance sheet and income
//! statement for a reporting period into a [`StatementSnapshot`], and serves
//! the daily price series used by the `prices` command.
//!
//! # Example
//!
//! ```rust,ignore
//! use cashcycle_core::{compute_metrics, FundamentalsSource, ReportingPeriod, Symbol};
//!
//! async fn dpo_of(source: &dyn FundamentalsSource) -> Option<f64> {
//!     let symbol = Symbol::parse("IBM").ok()?;
//!     let snapshot = source.snapshot(&symbol, ReportingPeriod::Annual).await.ok()?;
//!     compute_metrics(&snapshot.figures).dpo
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::report_date;
use crate::retry::RetryableError;
use crate::{FinancialSnapshot, PriceSeries, ReportingPeriod, Symbol};

/// One entity's figures for one period, with the report metadata they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSnapshot {
    pub symbol: Symbol,
    pub period: ReportingPeriod,
    #[serde(with = "report_date::option")]
    pub fiscal_date_ending: Option<Date>,
    pub reported_currency: Option<String>,
    pub figures: FinancialSnapshot,
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Internal,
}

impl SourceErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "source_unavailable",
            Self::RateLimited => "rate_limited",
            Self::InvalidRequest => "invalid_request",
            Self::Internal => "internal",
        }
    }
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    /// Same error, marked as not worth repeating.
    pub fn permanent(mut self) -> Self {
        self.retryable = false;
        self
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for SourceError {}

impl RetryableError for SourceError {
    fn is_retryable(&self) -> bool {
        self.retryable
    }
}

/// Provider contract consumed by the screener and the CLI.
pub trait FundamentalsSource: Send + Sync {
    /// Stable provider name used in envelopes and logs.
    fn id(&self) -> &'static str;

    /// Latest balance-sheet and income-statement figures for `period`.
    fn snapshot<'a>(
        &'a self,
        symbol: &'a Symbol,
        period: ReportingPeriod,
    ) -> Pin<Box<dyn Future<Output = Result<StatementSnapshot, SourceError>> + Send + 'a>>;

    /// The most recent `limit` daily prices, oldest first.
    fn daily_prices<'a>(
        &'a self,
        symbol: &'a Symbol,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>>;
}
