//! # Domain Models
//!
//! Canonical domain types shared by the ratio engine, the provider adapter
//! and the presentation layer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, upper-cased ticker |
//! | [`ReportingPeriod`] | Annual or most-recent-quarter report selection |
//! | [`DailyPrice`] | One day of the daily price series |
//! | [`PriceSeries`] | Daily prices for a symbol, oldest first |
//! | [`UtcDateTime`] | UTC timestamp used in envelopes |
//!
//! Report dates are plain [`time::Date`] values; [`parse_report_date`] and
//! [`format_report_date`] convert the provider's `YYYY-MM-DD` strings.

mod period;
mod prices;
mod symbol;
mod timestamp;

pub use period::ReportingPeriod;
pub use prices::{DailyPrice, PriceSeries};
pub use symbol::Symbol;
pub use timestamp::{format_report_date, parse_report_date, report_date, UtcDateTime};
