//! Contract tests for the Alpha Vantage adapter.
//!
//! Each test scripts the raw HTTP exchange with canned provider payloads and
//! checks what the adapter exposes through the `FundamentalsSource` trait.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cashcycle_core::{
    AlphaVantageAdapter, AlphaVantageConfig, FundamentalsSource, HttpClient, HttpError,
    HttpRequest, HttpResponse, ReportingPeriod, RetryConfig, SourceErrorKind, Symbol,
    ThrottlingQueue,
};
use serde_json::{json, Value};

// =============================================================================
// Test doubles
// =============================================================================

#[derive(Default)]
struct RecordingHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingHttpClient {
    fn scripted(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request log").clone()
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests.lock().expect("request log").push(request);
        let next = self
            .responses
            .lock()
            .expect("script")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::non_retryable("no scripted response left")));
        Box::pin(async move { next })
    }
}

fn adapter(client: Arc<RecordingHttpClient>) -> AlphaVantageAdapter {
    let mut config = AlphaVantageConfig::default()
        .with_api_key("contract-key")
        .with_base_url("http://alphavantage.test/query")
        .expect("valid base url")
        .with_timeout_ms(2_500);
    config.policy.retry = RetryConfig::fixed(Duration::ZERO, 1);

    AlphaVantageAdapter::with_http_client(client, config)
        .with_throttling(ThrottlingQueue::unlimited())
}

fn ok(body: Value) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::ok(body.to_string()))
}

fn status(code: u16, body: &str) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse {
        status: code,
        body: body.to_owned(),
    })
}

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}

// =============================================================================
// Canned payloads
// =============================================================================

fn balance_sheet() -> Value {
    json!({
        "symbol": "IBM",
        "annualReports": [
            {
                "fiscalDateEnding": "2023-12-31",
                "reportedCurrency": "USD",
                "currentNetReceivables": "32000",
                "inventory": "1100",
                "currentAccountsPayable": "4100"
            },
            {
                "fiscalDateEnding": "2024-12-31",
                "reportedCurrency": "USD",
                "currentNetReceivables": "30000",
                "inventory": "1200",
                "currentAccountsPayable": "4000"
            }
        ],
        "quarterlyReports": [
            {
                "fiscalDateEnding": "2025-03-31",
                "reportedCurrency": "USD",
                "currentNetReceivables": "12000",
                "inventory": "None",
                "currentAccountsPayable": "3000"
            }
        ]
    })
}

fn income_statement() -> Value {
    json!({
        "symbol": "IBM",
        "annualReports": [
            {
                "fiscalDateEnding": "2024-12-31",
                "reportedCurrency": "USD",
                "totalRevenue": "60000",
                "costOfRevenue": "27000"
            },
            {
                "fiscalDateEnding": "2023-12-31",
                "reportedCurrency": "USD",
                "totalRevenue": "58000",
                "costOfRevenue": "26000"
            }
        ],
        "quarterlyReports": [
            {
                "fiscalDateEnding": "2025-03-31",
                "reportedCurrency": "USD",
                "totalRevenue": "14000",
                "costOfRevenue": "6500"
            }
        ]
    })
}

fn daily_series(days: &[(&str, &str)]) -> Value {
    let series = days
        .iter()
        .map(|(date, close)| {
            (
                (*date).to_owned(),
                json!({
                    "1. open": close,
                    "2. high": close,
                    "3. low": close,
                    "4. close": close,
                    "5. volume": "1000"
                }),
            )
        })
        .collect::<serde_json::Map<_, _>>();

    json!({
        "Meta Data": { "2. Symbol": "IBM" },
        "Time Series (Daily)": series
    })
}

// =============================================================================
// Statement requests
// =============================================================================

#[tokio::test]
async fn when_snapshot_is_requested_system_calls_both_statement_endpoints() {
    // Given: both statements are served
    let client = RecordingHttpClient::scripted(vec![ok(balance_sheet()), ok(income_statement())]);
    let adapter = adapter(client.clone());

    // When: an annual snapshot is fetched
    adapter
        .snapshot(&symbol("ibm"), ReportingPeriod::Annual)
        .await
        .expect("snapshot should load");

    // Then: the balance sheet and income statement are queried with key and timeout
    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].url.starts_with("http://alphavantage.test/query?"));
    assert_eq!(
        query_param(&requests[0].url, "function").as_deref(),
        Some("BALANCE_SHEET")
    );
    assert_eq!(
        query_param(&requests[1].url, "function").as_deref(),
        Some("INCOME_STATEMENT")
    );
    for request in &requests {
        assert_eq!(query_param(&request.url, "symbol").as_deref(), Some("IBM"));
        assert_eq!(
            query_param(&request.url, "apikey").as_deref(),
            Some("contract-key")
        );
        assert_eq!(request.timeout_ms, 2_500);
        assert!(!request.redacted_url().contains("contract-key"));
    }
}

#[tokio::test]
async fn when_reports_are_out_of_order_system_uses_the_newest_fiscal_year() {
    // Given: the balance sheet lists the older year first
    let client = RecordingHttpClient::scripted(vec![ok(balance_sheet()), ok(income_statement())]);

    // When: an annual snapshot is fetched
    let snapshot = adapter(client)
        .snapshot(&symbol("IBM"), ReportingPeriod::Annual)
        .await
        .expect("snapshot should load");

    // Then: both statements come from fiscal 2024
    assert_eq!(
        snapshot.fiscal_date_ending.map(cashcycle_core::format_report_date),
        Some(String::from("2024-12-31"))
    );
    assert_eq!(snapshot.reported_currency.as_deref(), Some("USD"));
    assert_eq!(snapshot.figures.revenue, Some(60_000.0));
    assert_eq!(snapshot.figures.cost_of_goods_sold, Some(27_000.0));
    assert_eq!(snapshot.figures.accounts_receivable, Some(30_000.0));
    assert_eq!(snapshot.figures.inventory, Some(1_200.0));
    assert_eq!(snapshot.figures.accounts_payable, Some(4_000.0));
}

#[tokio::test]
async fn when_statement_dates_disagree_system_falls_back_to_latest_income_report() {
    // Given: the income statement has no report for the balance sheet date
    let mut income = income_statement();
    income["annualReports"][0]["fiscalDateEnding"] = json!("2024-09-30");
    income["annualReports"][0]["totalRevenue"] = json!("61000");
    let client = RecordingHttpClient::scripted(vec![ok(balance_sheet()), ok(income)]);

    // When: an annual snapshot is fetched
    let snapshot = adapter(client)
        .snapshot(&symbol("IBM"), ReportingPeriod::Annual)
        .await
        .expect("snapshot should load");

    // Then: the latest income report is used and the balance sheet date wins
    assert_eq!(snapshot.figures.revenue, Some(61_000.0));
    assert_eq!(
        snapshot.fiscal_date_ending.map(cashcycle_core::format_report_date),
        Some(String::from("2024-12-31"))
    );
}

#[tokio::test]
async fn when_quarterly_figure_is_none_system_reports_it_missing() {
    let client = RecordingHttpClient::scripted(vec![ok(balance_sheet()), ok(income_statement())]);

    let snapshot = adapter(client)
        .snapshot(&symbol("IBM"), ReportingPeriod::Quarterly)
        .await
        .expect("snapshot should load");

    assert_eq!(snapshot.period, ReportingPeriod::Quarterly);
    assert_eq!(snapshot.figures.inventory, None);
    assert_eq!(snapshot.figures.missing_fields(), vec!["inventory"]);
}

#[tokio::test]
async fn when_a_field_is_absent_system_counts_it_as_zero() {
    // Given: a balance sheet without an inventory line
    let mut balance = balance_sheet();
    balance["annualReports"][1]
        .as_object_mut()
        .expect("report object")
        .remove("inventory");
    let client = RecordingHttpClient::scripted(vec![ok(balance), ok(income_statement())]);

    let snapshot = adapter(client)
        .snapshot(&symbol("IBM"), ReportingPeriod::Annual)
        .await
        .expect("snapshot should load");

    assert_eq!(snapshot.figures.inventory, Some(0.0));
    assert!(snapshot.figures.is_complete());
}

// =============================================================================
// Upstream errors
// =============================================================================

#[tokio::test]
async fn when_symbol_is_unknown_system_returns_invalid_request_without_retry() {
    // Given: Alpha Vantage answers an unknown symbol with an empty object
    let client = RecordingHttpClient::scripted(vec![ok(json!({}))]);

    let error = adapter(client.clone())
        .snapshot(&symbol("NOPE"), ReportingPeriod::Annual)
        .await
        .expect_err("unknown symbol should fail");

    assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    assert!(!error.retryable());
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn when_provider_sends_error_message_system_returns_invalid_request() {
    let client = RecordingHttpClient::scripted(vec![ok(json!({
        "Error Message": "Invalid API call. Please retry or visit the documentation."
    }))]);

    let error = adapter(client)
        .snapshot(&symbol("IBM"), ReportingPeriod::Annual)
        .await
        .expect_err("error payload should fail");

    assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    assert!(error.message().contains("Invalid API call"));
}

#[tokio::test]
async fn when_minute_quota_note_arrives_system_retries_the_call() {
    // Given: one throttling note, then the real statements
    let client = RecordingHttpClient::scripted(vec![
        ok(json!({ "Note": "Our standard API call frequency is 5 calls per minute." })),
        ok(balance_sheet()),
        ok(income_statement()),
    ]);

    let snapshot = adapter(client.clone())
        .snapshot(&symbol("IBM"), ReportingPeriod::Annual)
        .await
        .expect("retry should recover");

    assert!(snapshot.figures.is_complete());
    assert_eq!(client.requests().len(), 3);
}

#[tokio::test]
async fn when_daily_quota_is_exhausted_system_fails_without_retry() {
    let client = RecordingHttpClient::scripted(vec![ok(json!({
        "Information": "You have reached the 25 requests per day limit of the free plan."
    }))]);

    let error = adapter(client.clone())
        .snapshot(&symbol("IBM"), ReportingPeriod::Annual)
        .await
        .expect_err("daily cap should fail");

    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    assert!(!error.retryable());
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn when_report_list_is_empty_system_returns_permanent_unavailable() {
    let client = RecordingHttpClient::scripted(vec![
        ok(json!({ "symbol": "IBM", "annualReports": [] })),
        ok(income_statement()),
    ]);

    let error = adapter(client)
        .snapshot(&symbol("IBM"), ReportingPeriod::Annual)
        .await
        .expect_err("empty report list should fail");

    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    assert!(!error.retryable());
}

#[tokio::test]
async fn when_body_is_not_json_system_returns_internal_error() {
    let client = RecordingHttpClient::scripted(vec![status(200, "<html>maintenance</html>")]);

    let error = adapter(client)
        .snapshot(&symbol("IBM"), ReportingPeriod::Annual)
        .await
        .expect_err("html body should fail");

    assert_eq!(error.kind(), SourceErrorKind::Internal);
}

#[tokio::test]
async fn when_status_is_not_retryable_system_fails_after_one_call() {
    let client = RecordingHttpClient::scripted(vec![status(404, "not found")]);

    let error = adapter(client.clone())
        .snapshot(&symbol("IBM"), ReportingPeriod::Annual)
        .await
        .expect_err("404 should fail");

    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    assert!(!error.retryable());
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn when_transport_fails_transiently_system_retries_then_succeeds() {
    let client = RecordingHttpClient::scripted(vec![
        Err(HttpError::new("connection reset")),
        ok(balance_sheet()),
        ok(income_statement()),
    ]);

    let snapshot = adapter(client.clone())
        .snapshot(&symbol("IBM"), ReportingPeriod::Annual)
        .await
        .expect("transient failure should be retried");

    assert_eq!(snapshot.figures.revenue, Some(60_000.0));
    assert_eq!(client.requests().len(), 3);
}

// =============================================================================
// Daily prices
// =============================================================================

#[tokio::test]
async fn when_prices_are_requested_system_returns_newest_days_oldest_first() {
    let client = RecordingHttpClient::scripted(vec![ok(daily_series(&[
        ("2025-01-06", "3.0"),
        ("2025-01-02", "1.0"),
        ("2025-01-03", "2.0"),
    ]))]);

    let series = adapter(client.clone())
        .daily_prices(&symbol("IBM"), 2)
        .await
        .expect("prices should load");

    let closes = series.prices.iter().map(|p| p.close).collect::<Vec<_>>();
    assert_eq!(closes, vec![2.0, 3.0]);
    assert_eq!(series.latest().and_then(|p| p.volume), Some(1000));

    let url = &client.requests()[0].url;
    assert_eq!(
        query_param(url, "function").as_deref(),
        Some("TIME_SERIES_DAILY")
    );
    assert_eq!(query_param(url, "outputsize").as_deref(), Some("compact"));
}

#[tokio::test]
async fn when_more_than_a_compact_page_is_requested_system_asks_for_full_output() {
    let client = RecordingHttpClient::scripted(vec![ok(daily_series(&[("2025-01-02", "1.0")]))]);

    let series = adapter(client.clone())
        .daily_prices(&symbol("IBM"), 250)
        .await
        .expect("prices should load");

    assert_eq!(series.len(), 1);
    assert_eq!(
        query_param(&client.requests()[0].url, "outputsize").as_deref(),
        Some("full")
    );
}

#[tokio::test]
async fn when_a_daily_bar_is_malformed_system_drops_only_that_day() {
    let mut payload = daily_series(&[("2025-01-02", "1.0"), ("2025-01-03", "2.0")]);
    payload["Time Series (Daily)"]["2025-01-03"]["4. close"] = json!("n/a");
    let client = RecordingHttpClient::scripted(vec![ok(payload)]);

    let series = adapter(client)
        .daily_prices(&symbol("IBM"), 10)
        .await
        .expect("prices should load");

    assert_eq!(series.len(), 1);
    assert_eq!(series.latest().map(|p| p.close), Some(1.0));
}

#[tokio::test]
async fn when_price_limit_is_zero_system_rejects_without_calling_provider() {
    let client = RecordingHttpClient::scripted(Vec::new());

    let error = adapter(client.clone())
        .daily_prices(&symbol("IBM"), 0)
        .await
        .expect_err("zero limit should fail");

    assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    assert!(client.requests().is_empty());
}
