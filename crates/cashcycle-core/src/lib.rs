//! # Cashcycle Core
//!
//! Working-capital ratio engine and the plumbing that feeds it.
//!
//! ## Overview
//!
//! - **Ratio engine** computing DPO, DIO, DSO and the cash conversion cycle
//!   with a strict missing-data policy
//! - **Alpha Vantage adapter** fetching balance sheets, income statements and
//!   daily prices behind the [`FundamentalsSource`] trait
//! - **Ticker universe** from inline lists, files or the S&P 500 list
//! - **Screener** that runs the engine over a universe and records skips
//! - **CSV export** and a **response envelope** for presentation layers
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Alpha Vantage adapter |
//! | [`config`] | Environment-driven adapter configuration |
//! | [`data_source`] | Source trait, statement snapshot and source errors |
//! | [`domain`] | Symbol, reporting period, daily prices, timestamps |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`export`] | CSV export |
//! | [`http_client`] | HTTP client abstraction |
//! | [`provider_policy`] | Quota and retry policies |
//! | [`ratios`] | DPO / DIO / DSO / CCC computation |
//! | [`retry`] | Backoff and retry loop |
//! | [`screener`] | Batch screening |
//! | [`throttling`] | Rate limiting support |
//! | [`universe`] | Ticker universe resolution |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cashcycle_core::{
//!     AlphaVantageAdapter, AlphaVantageConfig, ScreenOptions, Screener, Symbol,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = AlphaVantageAdapter::new(AlphaVantageConfig::from_env()?);
//!     let screener = Screener::new(adapter, ScreenOptions::default());
//!
//!     let report = screener.run(&[Symbol::parse("IBM")?]).await;
//!     for row in &report.rows {
//!         println!("{} CCC {:?}", row.symbol, row.metrics.ccc);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │    Screener     │────▶│  Ratio Engine    │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Fundamentals    │────▶│ Throttle + Retry │
//! │ Source (trait)  │     └────────┬─────────┘
//! └─────────────────┘              ▼
//!                         ┌──────────────────┐
//!                         │ HTTP Client      │
//!                         └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! The ratio engine never fails; undefined metrics are `None`. Fetching
//! returns a structured [`SourceError`]:
//!
//! ```rust
//! use cashcycle_core::{SourceError, SourceErrorKind};
//!
//! fn handle_error(error: SourceError) {
//!     match error.kind() {
//!         SourceErrorKind::RateLimited => {
//!             // Wait for the quota window
//!         }
//!         SourceErrorKind::InvalidRequest => {
//!             // Unknown symbol or rejected key
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys come from the environment or the command line and are redacted
//!   from logged URLs and `Debug` output

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod export;
pub mod http_client;
pub mod provider_policy;
pub mod ratios;
pub mod retry;
pub mod screener;
pub mod throttling;
pub mod universe;

// Adapter implementations
pub use adapters::AlphaVantageAdapter;

// Configuration
pub use config::AlphaVantageConfig;

// Data source trait and types
pub use data_source::{FundamentalsSource, SourceError, SourceErrorKind, StatementSnapshot};

// Domain models
pub use domain::{
    format_report_date, parse_report_date, DailyPrice, PriceSeries, ReportingPeriod, Symbol,
    UtcDateTime,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};

// Error types
pub use error::{ConfigError, ExportError, ValidationError};

// Export
pub use export::{export_csv, to_csv_string, write_csv, DEFAULT_EXPORT_FILE};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Provider policies
pub use provider_policy::ProviderPolicy;

// Ratio engine
pub use ratios::{compute_metrics, round2, FinancialSnapshot, MetricResult, DAYS_IN_PERIOD};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Screening
pub use screener::{ScreenOptions, ScreenReport, Screener, SkipReason, SkippedTicker, TickerMetrics};

// Throttling
pub use throttling::ThrottlingQueue;

// Ticker universe
pub use universe::{TickerSource, UniverseError};
