use serde::{Deserialize, Serialize};
use time::Date;

use super::timestamp::report_date;
use crate::Symbol;

/// One trading day of an unadjusted daily price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPrice {
    #[serde(with = "report_date")]
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

/// Daily prices for one symbol, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub prices: Vec<DailyPrice>,
}

impl PriceSeries {
    /// Builds a series, sorting by date and dropping repeated dates.
    pub fn new(symbol: Symbol, mut prices: Vec<DailyPrice>) -> Self {
        prices.sort_by_key(|price| price.date);
        prices.dedup_by_key(|price| price.date);
        Self { symbol, prices }
    }

    pub fn latest(&self) -> Option<&DailyPrice> {
        self.prices.last()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn price(date: Date, close: f64) -> DailyPrice {
        DailyPrice {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: None,
        }
    }

    #[test]
    fn orders_oldest_first_and_exposes_latest_close() {
        let symbol = Symbol::parse("IBM").expect("valid");
        let series = PriceSeries::new(
            symbol,
            vec![
                price(date!(2025 - 01 - 03), 171.0),
                price(date!(2025 - 01 - 02), 169.5),
            ],
        );

        assert_eq!(series.prices[0].date, date!(2025 - 01 - 02));
        assert_eq!(series.latest().map(|p| p.close), Some(171.0));
    }

    #[test]
    fn serializes_dates_as_iso_strings() {
        let json = serde_json::to_value(price(date!(2025 - 01 - 02), 1.0)).expect("serialize");
        assert_eq!(json["date"], "2025-01-02");
    }
}
