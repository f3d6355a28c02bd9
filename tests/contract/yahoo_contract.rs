//! Contract tests for the Yahoo adapter against recorded payloads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use time::macros::date;

use tickerboard_core::adapters::yahoo::{parse_chart_response, parse_quote_response};
use tickerboard_core::daily::collect_open_close;
use tickerboard_core::http_client::HttpFuture;
use tickerboard_core::{
    Adjustment, DateRange, HttpClient, HttpError, HttpRequest, HttpResponse, MarketDataAggregator,
    MarketDataProvider, SourceErrorKind, Symbol, YahooAdapter,
};

/// Recorded v8 chart payload: three New York sessions, 2024-01-02 to 2024-01-04.
const CHART_PAYLOAD: &str = r#"{
  "chart": {
    "result": [{
      "meta": {"currency": "USD", "symbol": "AAPL", "gmtoffset": -18000, "timezone": "EST"},
      "timestamp": [1704205800, 1704292200, 1704378600],
      "indicators": {
        "quote": [{
          "open":   [98.0, 102.0, 104.0],
          "high":   [101.0, 106.0, 108.0],
          "low":    [97.0, 100.0, 103.0],
          "close":  [100.0, 104.0, 106.0],
          "volume": [82488700, 58414500, 71983600]
        }],
        "adjclose": [{"adjclose": [50.0, 52.0, 53.0]}]
      }
    }],
    "error": null
  }
}"#;

/// Same sessions as [`CHART_PAYLOAD`], the middle one without a reported volume.
const CHART_MISSING_VOLUME: &str = r#"{
  "chart": {
    "result": [{
      "meta": {"currency": "USD", "symbol": "AAPL", "gmtoffset": -18000, "timezone": "EST"},
      "timestamp": [1704205800, 1704292200, 1704378600],
      "indicators": {
        "quote": [{
          "open":   [98.0, 102.0, 104.0],
          "high":   [101.0, 106.0, 108.0],
          "low":    [97.0, 100.0, 103.0],
          "close":  [100.0, 104.0, 106.0],
          "volume": [82488700, null, 71983600]
        }]
      }
    }],
    "error": null
  }
}"#;

/// Reply for a range without sessions (holiday, weekend, before listing).
const CHART_NO_SESSIONS: &str = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Data doesn't exist for startDate = 1704153600, endDate = 1704240000"}}}"#;

const CHART_NOT_FOUND: &str = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

const QUOTE_PAYLOAD: &str = r#"{
  "quoteResponse": {
    "result": [{
      "language": "en-US",
      "symbol": "AAPL",
      "regularMarketPrice": 150.0,
      "regularMarketPreviousClose": 100.0,
      "marketCap": 2345670000000
    }],
    "error": null
  }
}"#;

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote?symbols=AAPL&crumb=abcCrumb";

#[derive(Default)]
struct ScriptedHttpClient {
    responses: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(url.to_owned(), HttpResponse::with_status(status, body));
        self
    }

    fn requests_to(&self, url: &str) -> usize {
        self.requests
            .lock()
            .expect("request log")
            .iter()
            .filter(|requested| requested.as_str() == url)
            .count()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            self.requests
                .lock()
                .expect("request log")
                .push(request.url.clone());
            self.responses
                .get(&request.url)
                .cloned()
                .ok_or_else(|| HttpError::new(format!("unscripted url {}", request.url)))
        })
    }
}

fn aapl() -> Symbol {
    Symbol::parse("AAPL").expect("valid symbol")
}

fn first_two_sessions() -> DateRange {
    DateRange::new(date!(2024 - 01 - 02), date!(2024 - 01 - 04)).expect("valid range")
}

#[test]
fn chart_range_end_is_exclusive() {
    let series = parse_chart_response(&aapl(), CHART_PAYLOAD, first_two_sessions(), Adjustment::Raw)
        .expect("chart parses");

    let dates = series.bars.iter().map(|bar| bar.date).collect::<Vec<_>>();
    assert_eq!(dates, vec![date!(2024 - 01 - 02), date!(2024 - 01 - 03)]);
}

#[test]
fn chart_dates_use_exchange_offset() {
    let range = DateRange::single_day(date!(2024 - 01 - 04));
    let series = parse_chart_response(&aapl(), CHART_PAYLOAD, range, Adjustment::Raw)
        .expect("chart parses");

    assert_eq!(series.len(), 1);
    assert_eq!(series.bars[0].close, 106.0);
}

#[test]
fn raw_chart_keeps_traded_prices() {
    let series = parse_chart_response(&aapl(), CHART_PAYLOAD, first_two_sessions(), Adjustment::Raw)
        .expect("chart parses");

    let first = &series.bars[0];
    assert_eq!(
        (first.open, first.high, first.low, first.close),
        (98.0, 101.0, 97.0, 100.0)
    );
    assert_eq!(first.volume, 82_488_700);
    assert_eq!(series.bars[1].volume, 58_414_500);
}

#[test]
fn chart_bar_without_volume_is_dropped() {
    let range = DateRange::new(date!(2024 - 01 - 02), date!(2024 - 01 - 05)).expect("valid range");
    let series = parse_chart_response(&aapl(), CHART_MISSING_VOLUME, range, Adjustment::Raw)
        .expect("chart parses");

    let dates = series.bars.iter().map(|bar| bar.date).collect::<Vec<_>>();
    assert_eq!(dates, vec![date!(2024 - 01 - 02), date!(2024 - 01 - 04)]);
}

#[test]
fn adjusted_chart_scales_every_price_by_adjclose_factor() {
    let series = parse_chart_response(
        &aapl(),
        CHART_PAYLOAD,
        first_two_sessions(),
        Adjustment::Adjusted,
    )
    .expect("chart parses");

    let first = &series.bars[0];
    assert_eq!(
        (first.open, first.high, first.low, first.close),
        (49.0, 50.5, 48.5, 50.0)
    );
    assert_eq!(series.bars[1].close, 52.0);
    assert_eq!(series.bars[1].open, 51.0);
}

#[test]
fn quote_payload_maps_to_snapshot() {
    let snapshot = parse_quote_response(&aapl(), QUOTE_PAYLOAD).expect("quote parses");

    assert_eq!(snapshot.current_price, Some(150.0));
    assert_eq!(snapshot.previous_close, Some(100.0));
    assert_eq!(snapshot.market_cap, Some(2_345_670_000_000.0));
}

#[tokio::test]
async fn history_requests_chart_with_exclusive_period2() {
    let range = first_two_sessions();
    let chart_url = YahooAdapter::chart_url(&aapl(), range);
    assert!(chart_url.contains("period2=1704326400"));

    let client = Arc::new(ScriptedHttpClient::default().respond(&chart_url, 200, CHART_PAYLOAD));
    let adapter = YahooAdapter::new(client.clone());

    let series = adapter
        .history(&aapl(), range, Adjustment::default())
        .await
        .expect("history succeeds");

    assert_eq!(series.len(), 2);
    assert_eq!(client.requests_to(&chart_url), 1);
}

#[tokio::test]
async fn history_maps_not_found_and_rate_limit_statuses() {
    let range = first_two_sessions();
    let missing = Symbol::parse("ZZZZ").expect("valid symbol");
    let client = Arc::new(
        ScriptedHttpClient::default()
            .respond(&YahooAdapter::chart_url(&missing, range), 404, CHART_NOT_FOUND)
            .respond(&YahooAdapter::chart_url(&aapl(), range), 429, "Too Many Requests"),
    );
    let adapter = YahooAdapter::new(client);

    let not_found = adapter
        .history(&missing, range, Adjustment::Raw)
        .await
        .expect_err("unknown symbol");
    assert_eq!(not_found.kind(), SourceErrorKind::NotFound);

    let limited = adapter
        .history(&aapl(), range, Adjustment::Raw)
        .await
        .expect_err("rate limited");
    assert_eq!(limited.kind(), SourceErrorKind::RateLimited);
    assert_eq!(limited.code(), "source.rate_limited");
}

#[tokio::test]
async fn history_without_sessions_in_range_is_not_found() {
    let range = DateRange::single_day(date!(2024 - 01 - 01));
    let client = Arc::new(ScriptedHttpClient::default().respond(
        &YahooAdapter::chart_url(&aapl(), range),
        400,
        CHART_NO_SESSIONS,
    ));
    let adapter = YahooAdapter::new(client);

    let error = adapter
        .history(&aapl(), range, Adjustment::default())
        .await
        .expect_err("no sessions");

    assert_eq!(error.kind(), SourceErrorKind::NotFound);
}

#[tokio::test]
async fn bad_request_without_chart_body_stays_unavailable() {
    let range = first_two_sessions();
    let client = Arc::new(ScriptedHttpClient::default().respond(
        &YahooAdapter::chart_url(&aapl(), range),
        400,
        "Bad Request",
    ));
    let adapter = YahooAdapter::new(client);

    let error = adapter
        .history(&aapl(), range, Adjustment::Raw)
        .await
        .expect_err("opaque 400");

    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    assert_eq!(error.code(), "source.unavailable");
}

#[tokio::test]
async fn symbol_without_sessions_is_skipped_by_batch_and_daily_job() {
    // Given: AAPL traded on the day, MSFT has no session in the range
    let day = date!(2024 - 01 - 02);
    let range = DateRange::single_day(day);
    let msft = Symbol::parse("MSFT").expect("valid symbol");
    let client = Arc::new(
        ScriptedHttpClient::default()
            .respond(&YahooAdapter::chart_url(&aapl(), range), 200, CHART_PAYLOAD)
            .respond(&YahooAdapter::chart_url(&msft, range), 400, CHART_NO_SESSIONS),
    );
    let adapter = YahooAdapter::new(client);
    let symbols = vec![aapl(), msft.clone()];

    // When: The history batch and the daily job run over both symbols
    let batch = MarketDataAggregator::new(&adapter)
        .history(&symbols, range)
        .await
        .expect("batch succeeds");
    let report = collect_open_close(&adapter, &symbols, day)
        .await
        .expect("daily job succeeds");

    // Then: MSFT is skipped and AAPL still comes through
    assert_eq!(batch.skipped(), &[msft.clone()]);
    assert_eq!(batch.symbols(), vec![aapl()]);
    assert_eq!(report.skipped, vec![msft]);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].ticker, aapl());
}

#[tokio::test]
async fn snapshot_performs_crumb_handshake_once() {
    let client = Arc::new(
        ScriptedHttpClient::default()
            .respond(COOKIE_URL, 404, "")
            .respond(CRUMB_URL, 200, "abcCrumb")
            .respond(QUOTE_URL, 200, QUOTE_PAYLOAD),
    );
    let adapter = YahooAdapter::new(client.clone());

    let first = adapter.snapshot(&aapl()).await.expect("first snapshot");
    let second = adapter.snapshot(&aapl()).await.expect("second snapshot");

    assert_eq!(first, second);
    assert_eq!(client.requests_to(COOKIE_URL), 1);
    assert_eq!(client.requests_to(CRUMB_URL), 1);
    assert_eq!(client.requests_to(QUOTE_URL), 2);
}

#[tokio::test]
async fn rejected_crumb_is_refreshed_on_next_snapshot() {
    let client = Arc::new(
        ScriptedHttpClient::default()
            .respond(COOKIE_URL, 404, "")
            .respond(CRUMB_URL, 200, "abcCrumb")
            .respond(QUOTE_URL, 401, "Unauthorized"),
    );
    let adapter = YahooAdapter::new(client.clone());

    let error = adapter.snapshot(&aapl()).await.expect_err("crumb rejected");
    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    let _ = adapter.snapshot(&aapl()).await;

    assert_eq!(client.requests_to(CRUMB_URL), 2);
}
