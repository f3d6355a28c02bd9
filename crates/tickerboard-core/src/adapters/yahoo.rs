use std::sync::Arc;

use serde::Deserialize;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::debug;

use crate::data_source::{
    Adjustment, MarketDataProvider, SourceError, SourceErrorKind, SourceFuture,
};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, DEFAULT_TIMEOUT_MS};
use crate::{DateRange, PriceBar, PriceSeries, Snapshot, Symbol};

const CHART_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const QUOTE_BASE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const REFERER: &str = "https://finance.yahoo.com/";

// ============================================================================
// Crumb handshake
// ============================================================================

/// Holds the crumb token required by the quote endpoint.
///
/// Yahoo hands out a session cookie on `fc.yahoo.com` (kept by the transport's
/// cookie jar) and a crumb bound to that cookie on `getcrumb`.
#[derive(Debug, Default)]
pub struct YahooAuthManager {
    crumb: Mutex<Option<String>>,
}

impl YahooAuthManager {
    pub async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        timeout_ms: u64,
    ) -> Result<String, SourceError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        let crumb = fetch_crumb(http_client, timeout_ms).await?;
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    /// Drop the cached crumb so the next call performs the handshake again.
    pub async fn invalidate(&self) {
        *self.crumb.lock().await = None;
    }
}

async fn fetch_crumb(http_client: &dyn HttpClient, timeout_ms: u64) -> Result<String, SourceError> {
    // The cookie endpoint answers 404 but still sets the session cookie.
    let cookie_request = HttpRequest::get(COOKIE_URL)
        .with_header("referer", REFERER)
        .with_timeout_ms(timeout_ms);
    http_client.execute(cookie_request).await.map_err(|e| {
        SourceError::unavailable(format!("failed to fetch yahoo cookie: {}", e.message()))
    })?;

    for endpoint in CRUMB_URLS {
        let request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_timeout_ms(timeout_ms);

        let Ok(response) = http_client.execute(request).await else {
            continue;
        };
        if response.status == 429 {
            return Err(SourceError::rate_limited(
                "yahoo rate limited while fetching crumb",
            ));
        }
        if !response.is_success() {
            continue;
        }

        let body = response.body.trim();
        if body.is_empty() || body.contains('<') || body.contains(' ') || body.len() >= 100 {
            continue;
        }
        return Ok(body.to_owned());
    }

    Err(SourceError::unavailable(
        "failed to fetch yahoo crumb from all endpoints",
    ))
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance adapter for daily history and quote snapshots.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: Arc<YahooAuthManager>,
    timeout_ms: u64,
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth: Arc::new(YahooAuthManager::default()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Chart endpoint for one symbol; `period2` is the exclusive range end.
    pub fn chart_url(symbol: &Symbol, range: DateRange) -> String {
        format!(
            "{CHART_BASE_URL}/{}?period1={}&period2={}&interval=1d&includeAdjustedClose=true&events=div%2Csplits",
            urlencoding::encode(symbol.as_str()),
            range.start_unix(),
            range.end_unix(),
        )
    }

    async fn get(&self, url: &str) -> Result<HttpResponse, SourceError> {
        let request = HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms);
        self.http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::unavailable(format!("yahoo transport error: {}", e.message())))
    }

    async fn fetch_history(
        &self,
        symbol: &Symbol,
        range: DateRange,
        adjustment: Adjustment,
    ) -> Result<PriceSeries, SourceError> {
        let url = Self::chart_url(symbol, range);
        debug!(symbol = %symbol, %range, "requesting yahoo chart");

        let response = self.get(&url).await?;
        if response.is_success() {
            return parse_chart_response(symbol, &response.body, range, adjustment);
        }
        // 400 and 404 carry a chart error body; let the parser classify it.
        if response.status != 400 && response.status != 404 {
            return Err(status_error(response.status));
        }

        match parse_chart_response(symbol, &response.body, range, adjustment) {
            Err(error) if error.kind() == SourceErrorKind::Internal => {
                Err(status_error(response.status))
            }
            Err(error) => Err(error),
            Ok(_) => Err(status_error(response.status)),
        }
    }

    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<Snapshot, SourceError> {
        let crumb = self
            .auth
            .crumb(self.http_client.as_ref(), self.timeout_ms)
            .await?;
        let url = format!(
            "{QUOTE_BASE_URL}?symbols={}&crumb={}",
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(&crumb)
        );

        let response = self.get(&url).await?;
        if response.status == 401 || response.status == 403 {
            self.auth.invalidate().await;
            return Err(SourceError::unavailable(format!(
                "yahoo rejected crumb with status {}",
                response.status
            )));
        }
        if !response.is_success() {
            return Err(status_error(response.status));
        }

        parse_quote_response(symbol, &response.body)
    }
}

impl MarketDataProvider for YahooAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: DateRange,
        adjustment: Adjustment,
    ) -> SourceFuture<'a, PriceSeries> {
        Box::pin(self.fetch_history(symbol, range, adjustment))
    }

    fn snapshot<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, Snapshot> {
        Box::pin(self.fetch_snapshot(symbol))
    }
}

fn status_error(status: u16) -> SourceError {
    match status {
        404 => SourceError::not_found("yahoo returned status 404"),
        429 => SourceError::rate_limited("yahoo returned status 429"),
        _ => SourceError::unavailable(format!("yahoo returned status {status}")),
    }
}

/// Yahoo answers ranges without sessions (holidays, weekends, before listing)
/// with a "Bad Request" chart error.
fn signals_no_data(description: &str) -> bool {
    description.starts_with("Data doesn't exist") || description.starts_with("No data found")
}

/// Parse a v8 chart payload into a series restricted to `range`.
///
/// Bars missing any OHLC value or the volume are dropped. With [`Adjustment::Adjusted`]
/// every price is scaled by `adjclose / close` of the same bar.
pub fn parse_chart_response(
    symbol: &Symbol,
    body: &str,
    range: DateRange,
    adjustment: Adjustment,
) -> Result<PriceSeries, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        return Err(if error.code == "Not Found" || signals_no_data(&error.description) {
            SourceError::not_found(format!("{symbol}: {}", error.description))
        } else {
            SourceError::unavailable(format!(
                "yahoo chart error {}: {}",
                error.code, error.description
            ))
        });
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::empty(symbol.clone()));
    };
    let Some(timestamps) = result.timestamp else {
        return Ok(PriceSeries::empty(symbol.clone()));
    };

    let gmt_offset = result.meta.and_then(|meta| meta.gmtoffset).unwrap_or(0);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adj_closes = result
        .indicators
        .adjclose
        .and_then(|series| series.into_iter().next())
        .map(|series| series.adjclose)
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = OffsetDateTime::from_unix_timestamp(ts + gmt_offset)
            .map_err(|e| SourceError::internal(format!("invalid timestamp {ts}: {e}")))?
            .date();
        if !range.contains(date) {
            continue;
        }

        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            value_at(&quote.close, i),
            quote.volume.get(i).copied().flatten(),
        ) else {
            debug!(symbol = %symbol, %date, "dropping incomplete bar");
            continue;
        };

        let factor = match adjustment {
            Adjustment::Raw => 1.0,
            Adjustment::Adjusted => value_at(&adj_closes, i)
                .filter(|_| close != 0.0)
                .map_or(1.0, |adj| adj / close),
        };

        match PriceBar::new(
            date,
            open * factor,
            high * factor,
            low * factor,
            close * factor,
            volume,
        ) {
            Ok(bar) => bars.push(bar),
            Err(error) => debug!(symbol = %symbol, %error, "dropping malformed bar"),
        }
    }

    Ok(PriceSeries::new(symbol.clone(), bars))
}

/// Parse a v7 quote payload into the snapshot for `symbol`.
pub fn parse_quote_response(symbol: &Symbol, body: &str) -> Result<Snapshot, SourceError> {
    let response: YahooQuoteResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo quote: {e}")))?;

    if let Some(error) = response.quote_response.error {
        return Err(SourceError::unavailable(format!(
            "yahoo quote error: {error}"
        )));
    }

    let quote = response
        .quote_response
        .result
        .into_iter()
        .find(|quote| quote.symbol.eq_ignore_ascii_case(symbol.as_str()))
        .ok_or_else(|| SourceError::not_found(format!("no yahoo quote for {symbol}")))?;

    Snapshot::new(
        symbol.clone(),
        quote.regular_market_price,
        quote.regular_market_previous_close,
        quote.market_cap,
    )
    .map_err(|e| SourceError::internal(format!("invalid yahoo quote for {symbol}: {e}")))
}

fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values
        .get(index)
        .copied()
        .flatten()
        .filter(|value| value.is_finite())
}

// Yahoo Finance API response structures
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
    #[serde(default)]
    adjclose: Option<Vec<YahooAdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResponseData,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResponseData {
    #[serde(default)]
    result: Vec<YahooQuoteData>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteData {
    symbol: String,
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<f64>,
    #[serde(rename = "regularMarketPreviousClose", default)]
    regular_market_previous_close: Option<f64>,
    #[serde(rename = "marketCap", default)]
    market_cap: Option<f64>,
}
