use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use time::Date;

use crate::config::AlphaVantageConfig;
use crate::data_source::{FundamentalsSource, SourceError, StatementSnapshot};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::retry::with_retry;
use crate::throttling::ThrottlingQueue;
use crate::{
    parse_report_date, DailyPrice, FinancialSnapshot, PriceSeries, ReportingPeriod, Symbol,
};

const BALANCE_SHEET: &str = "BALANCE_SHEET";
const INCOME_STATEMENT: &str = "INCOME_STATEMENT";
const TIME_SERIES_DAILY: &str = "TIME_SERIES_DAILY";

/// Rows returned by `outputsize=compact`.
const COMPACT_SERIES_LEN: usize = 100;

type Report = Map<String, Value>;

/// Alpha Vantage fundamentals and daily price adapter.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    http_client: Arc<dyn HttpClient>,
    config: AlphaVantageConfig,
    throttling: ThrottlingQueue,
}

impl std::fmt::Debug for AlphaVantageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AlphaVantageAdapter {
    pub fn new(config: AlphaVantageConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), config)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: AlphaVantageConfig) -> Self {
        let throttling = ThrottlingQueue::from_policy(&config.policy);
        Self {
            http_client,
            config,
            throttling,
        }
    }

    /// Replaces the call budget, e.g. to share one quota between adapters.
    pub fn with_throttling(mut self, throttling: ThrottlingQueue) -> Self {
        self.throttling = throttling;
        self
    }

    async fn query(&self, function: &str, params: &[(&str, &str)]) -> Result<Value, SourceError> {
        with_retry(&self.config.policy.retry, function, move |_| {
            self.query_once(function, params)
        })
        .await
    }

    async fn query_once(&self, function: &str, params: &[(&str, &str)]) -> Result<Value, SourceError> {
        self.throttling.wait().await;

        let request = params
            .iter()
            .fold(
                HttpRequest::get(&self.config.base_url).with_query("function", function),
                |request, (name, value)| request.with_query(name, value),
            )
            .with_query("apikey", &self.config.api_key)
            .with_timeout_ms(self.config.timeout_ms);
        tracing::debug!(url = %request.redacted_url(), "alphavantage request");

        let response = self.http_client.execute(request).await.map_err(|error| {
            let source_error =
                SourceError::unavailable(format!("alphavantage transport error: {}", error.message()));
            if error.retryable() {
                source_error
            } else {
                source_error.permanent()
            }
        })?;

        if !response.is_success() {
            let error = SourceError::unavailable(format!(
                "alphavantage returned status {}",
                response.status
            ));
            return Err(if self.config.policy.retry.should_retry_status(response.status) {
                error
            } else {
                error.permanent()
            });
        }

        let payload: Value = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::internal(format!("failed to parse alphavantage {function} response: {e}"))
        })?;
        check_upstream_message(&payload)?;
        Ok(payload)
    }

    async fn fetch_snapshot(
        &self,
        symbol: &Symbol,
        period: ReportingPeriod,
    ) -> Result<StatementSnapshot, SourceError> {
        let params = [("symbol", symbol.as_str())];
        let balance_payload = self.query(BALANCE_SHEET, &params).await?;
        let income_payload = self.query(INCOME_STATEMENT, &params).await?;

        let balance_reports = statement_reports(balance_payload, symbol, period, BALANCE_SHEET)?;
        let income_reports = statement_reports(income_payload, symbol, period, INCOME_STATEMENT)?;

        let balance = &balance_reports[0];
        let balance_date = report_date(balance);
        let income = match balance_date {
            Some(date) => income_reports
                .iter()
                .find(|report| report_date(report) == Some(date))
                .unwrap_or_else(|| {
                    tracing::warn!(
                        %symbol,
                        %date,
                        "no income statement for the balance sheet date; using the latest one"
                    );
                    &income_reports[0]
                }),
            None => &income_reports[0],
        };

        Ok(StatementSnapshot {
            symbol: symbol.clone(),
            period,
            fiscal_date_ending: balance_date.or_else(|| report_date(income)),
            reported_currency: report_text(balance, "reportedCurrency")
                .or_else(|| report_text(income, "reportedCurrency")),
            figures: FinancialSnapshot {
                revenue: figure(income, "totalRevenue"),
                cost_of_goods_sold: figure(income, "costOfRevenue"),
                accounts_receivable: figure(balance, "currentNetReceivables"),
                inventory: figure(balance, "inventory"),
                accounts_payable: figure(balance, "currentAccountsPayable"),
            },
        })
    }

    async fn fetch_daily_prices(
        &self,
        symbol: &Symbol,
        limit: usize,
    ) -> Result<PriceSeries, SourceError> {
        let output_size = if limit > COMPACT_SERIES_LEN {
            "full"
        } else {
            "compact"
        };
        let payload = self
            .query(
                TIME_SERIES_DAILY,
                &[("symbol", symbol.as_str()), ("outputsize", output_size)],
            )
            .await?;

        let response: DailySeriesResponse = serde_json::from_value(payload).map_err(|e| {
            SourceError::internal(format!("failed to parse alphavantage daily series: {e}"))
        })?;
        let series = response.series.ok_or_else(|| {
            SourceError::invalid_request(format!("no daily price series for {symbol}"))
        })?;

        let mut prices = series
            .into_iter()
            .filter_map(|(date, bar)| match bar.into_price(&date) {
                Ok(price) => Some(price),
                Err(reason) => {
                    tracing::warn!(%symbol, %date, "dropping daily bar: {reason}");
                    None
                }
            })
            .collect::<Vec<_>>();
        prices.sort_by_key(|price| std::cmp::Reverse(price.date));
        prices.truncate(limit);

        Ok(PriceSeries::new(symbol.clone(), prices))
    }
}

impl FundamentalsSource for AlphaVantageAdapter {
    fn id(&self) -> &'static str {
        self.config.policy.provider
    }

    fn snapshot<'a>(
        &'a self,
        symbol: &'a Symbol,
        period: ReportingPeriod,
    ) -> Pin<Box<dyn Future<Output = Result<StatementSnapshot, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_snapshot(symbol, period))
    }

    fn daily_prices<'a>(
        &'a self,
        symbol: &'a Symbol,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if limit == 0 {
                return Err(SourceError::invalid_request(
                    "daily price limit must be greater than zero",
                ));
            }
            self.fetch_daily_prices(symbol, limit).await
        })
    }
}

/// Maps Alpha Vantage's in-band messages (served with status 200) to errors.
fn check_upstream_message(payload: &Value) -> Result<(), SourceError> {
    let text = |key: &str| payload.get(key).and_then(Value::as_str);

    if let Some(message) = text("Error Message") {
        return Err(SourceError::invalid_request(format!(
            "alphavantage rejected the request: {message}"
        )));
    }
    if let Some(message) = text("Note").or_else(|| text("Information")) {
        let error = SourceError::rate_limited(format!("alphavantage: {message}"));
        // The daily cap does not reset within any retry window.
        let daily_cap = message.to_ascii_lowercase().contains("per day");
        return Err(if daily_cap { error.permanent() } else { error });
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(rename = "annualReports")]
    annual_reports: Option<Vec<Report>>,
    #[serde(rename = "quarterlyReports")]
    quarterly_reports: Option<Vec<Report>>,
}

/// Reports of the requested period, newest first; never empty on success.
fn statement_reports(
    payload: Value,
    symbol: &Symbol,
    period: ReportingPeriod,
    function: &str,
) -> Result<Vec<Report>, SourceError> {
    let response: StatementResponse = serde_json::from_value(payload).map_err(|e| {
        SourceError::internal(format!("failed to parse alphavantage {function} response: {e}"))
    })?;

    let mut reports = match period {
        ReportingPeriod::Annual => response.annual_reports,
        ReportingPeriod::Quarterly => response.quarterly_reports,
    }
    .ok_or_else(|| {
        SourceError::invalid_request(format!("{function} has no {period} reports for {symbol}"))
    })?;

    if reports.is_empty() {
        return Err(SourceError::unavailable(format!(
            "{function} returned an empty {period} report list for {symbol}"
        ))
        .permanent());
    }

    // Provider order is newest first; a stable sort keeps it when dates are missing.
    reports.sort_by_key(|report| std::cmp::Reverse(report_date(report)));
    Ok(reports)
}

/// Reads one reported figure: an absent key counts as zero, anything that
/// is present but not a finite number (Alpha Vantage writes `"None"`) is missing.
fn figure(report: &Report, field: &str) -> Option<f64> {
    match report.get(field) {
        None => Some(0.0),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
        Some(_) => None,
    }
    .filter(|value| value.is_finite())
}

fn report_date(report: &Report) -> Option<Date> {
    report
        .get("fiscalDateEnding")
        .and_then(Value::as_str)
        .and_then(|raw| parse_report_date(raw).ok())
}

fn report_text(report: &Report, field: &str) -> Option<String> {
    report
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != "None")
        .map(str::to_owned)
}

#[derive(Debug, Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    series: Option<std::collections::BTreeMap<String, DailyBar>>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume", default)]
    volume: Option<String>,
}

impl DailyBar {
    fn into_price(self, date: &str) -> Result<DailyPrice, String> {
        let number = |field: &str, raw: &str| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| format!("{field} is not numeric: '{raw}'"))
        };

        Ok(DailyPrice {
            date: parse_report_date(date).map_err(|e| e.to_string())?,
            open: number("open", &self.open)?,
            high: number("high", &self.high)?,
            low: number("low", &self.low)?,
            close: number("close", &self.close)?,
            volume: self.volume.and_then(|raw| raw.trim().parse::<u64>().ok()),
        })
    }
}
