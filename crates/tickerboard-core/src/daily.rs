//! Daily open/close batch over a fixed ticker list.

use serde::Serialize;
use time::{Date, Duration};
use tracing::{info, warn};

use crate::aggregator::OpenCloseRow;
use crate::data_source::{Adjustment, MarketDataProvider, SourceError, SourceErrorKind};
use crate::domain::iso_date;
use crate::{today_utc, DateRange, Symbol};

/// Open/close rows for one trading day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    #[serde(with = "iso_date")]
    pub day: Date,
    pub rows: Vec<OpenCloseRow>,
    /// Tickers with no bar on `day`.
    pub skipped: Vec<Symbol>,
}

/// The calendar day before today (UTC).
pub fn yesterday_utc() -> Date {
    today_utc() - Duration::days(1)
}

/// Collect the first bar's open and close on `day` for each ticker, in list order.
pub async fn collect_open_close(
    provider: &dyn MarketDataProvider,
    tickers: &[Symbol],
    day: Date,
) -> Result<DailyReport, SourceError> {
    let range = DateRange::single_day(day);
    let mut report = DailyReport {
        day,
        rows: Vec::with_capacity(tickers.len()),
        skipped: Vec::new(),
    };

    for ticker in tickers {
        let bar = match provider.history(ticker, range, Adjustment::default()).await {
            Ok(series) => series.bars.into_iter().next(),
            Err(error) if error.kind() == SourceErrorKind::NotFound => None,
            Err(error) => return Err(error),
        };

        match bar {
            Some(bar) => report.rows.push(OpenCloseRow {
                date: bar.date,
                ticker: ticker.clone(),
                open: bar.open,
                close: bar.close,
            }),
            None => {
                warn!(ticker = %ticker, range = %range, "no daily bar, skipping");
                report.skipped.push(ticker.clone());
            }
        }
    }

    info!(
        rows = report.rows.len(),
        skipped = report.skipped.len(),
        "collected daily open/close"
    );
    Ok(report)
}
