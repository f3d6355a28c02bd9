//! # Market Data Aggregator
//!
//! Fetches per-symbol history and snapshots from a [`MarketDataProvider`]
//! and assembles the tables the CLI renders and exports.
//!
//! | Operation | Output |
//! |-----------|--------|
//! | [`MarketDataAggregator::history`] | [`HistoryBatch`] |
//! | [`MarketDataAggregator::snapshots`] | `Vec<Snapshot>` |
//! | [`MarketDataAggregator::portfolio`] | [`PortfolioSummary`] |
//!
//! Symbols are fetched one after another in input order. A symbol with no
//! bars in range, or one the provider does not know, is skipped and listed
//! in [`HistoryBatch::skipped`]; every other provider error aborts the call.

use std::collections::HashSet;

use serde::Serialize;
use time::Date;
use tracing::{info, warn};

use crate::analytics::{MovingAverageTable, PortfolioSummary};
use crate::data_source::{Adjustment, MarketDataProvider, SourceError, SourceErrorKind};
use crate::domain::iso_date;
use crate::{DateRange, PriceSeries, Snapshot, Symbol, ValidationError};

/// One bar of the full-history extract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub ticker: Symbol,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// One bar of the open/close extract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenCloseRow {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub ticker: Symbol,
    pub open: f64,
    pub close: f64,
}

/// A close price on a date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CloseRow {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub close: f64,
}

/// History for a set of symbols over one date range.
///
/// Holds the same shape whether one symbol or many were requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryBatch {
    range: Option<DateRange>,
    series: Vec<PriceSeries>,
    skipped: Vec<Symbol>,
}

impl HistoryBatch {
    /// Batch with no symbols, as returned for an empty request.
    pub fn empty() -> Self {
        Self {
            range: None,
            series: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub const fn range(&self) -> Option<DateRange> {
        self.range
    }

    /// Non-empty series in input order.
    pub fn series(&self) -> &[PriceSeries] {
        &self.series
    }

    /// Symbols with no data in range.
    pub fn skipped(&self) -> &[Symbol] {
        &self.skipped
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&PriceSeries> {
        self.series.iter().find(|series| &series.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.series
            .iter()
            .map(|series| series.symbol.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Every bar of every series, grouped by symbol.
    pub fn history_rows(&self) -> Vec<HistoryRow> {
        self.series
            .iter()
            .flat_map(|series| {
                series.bars.iter().map(|bar| HistoryRow {
                    date: bar.date,
                    ticker: series.symbol.clone(),
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    volume: bar.volume,
                })
            })
            .collect()
    }

    pub fn open_close_rows(&self) -> Vec<OpenCloseRow> {
        self.series
            .iter()
            .flat_map(|series| {
                series.bars.iter().map(|bar| OpenCloseRow {
                    date: bar.date,
                    ticker: series.symbol.clone(),
                    open: bar.open,
                    close: bar.close,
                })
            })
            .collect()
    }

    /// `None` when `symbol` is not part of the batch.
    pub fn close_history(&self, symbol: &Symbol) -> Option<Vec<CloseRow>> {
        self.get(symbol).map(|series| {
            series
                .bars
                .iter()
                .map(|bar| CloseRow {
                    date: bar.date,
                    close: bar.close,
                })
                .collect()
        })
    }

    pub fn moving_averages(
        &self,
        symbol: &Symbol,
        windows: &[usize],
    ) -> Option<Result<MovingAverageTable, ValidationError>> {
        self.get(symbol)
            .map(|series| MovingAverageTable::from_series(series, windows))
    }
}

/// Sequential per-symbol fetcher over a borrowed provider.
pub struct MarketDataAggregator<'a> {
    provider: &'a dyn MarketDataProvider,
    adjustment: Adjustment,
}

impl<'a> MarketDataAggregator<'a> {
    pub fn new(provider: &'a dyn MarketDataProvider) -> Self {
        Self {
            provider,
            adjustment: Adjustment::default(),
        }
    }

    pub fn with_adjustment(mut self, adjustment: Adjustment) -> Self {
        self.adjustment = adjustment;
        self
    }

    pub async fn history(
        &self,
        symbols: &[Symbol],
        range: DateRange,
    ) -> Result<HistoryBatch, SourceError> {
        if symbols.is_empty() {
            return Ok(HistoryBatch::empty());
        }

        let mut batch = HistoryBatch {
            range: Some(range),
            series: Vec::with_capacity(symbols.len()),
            skipped: Vec::new(),
        };
        for symbol in unique(symbols) {
            info!(
                provider = self.provider.name(),
                symbol = %symbol,
                range = %range,
                "fetching price history"
            );
            match self.provider.history(symbol, range, self.adjustment).await {
                Ok(series) if series.is_empty() => {
                    warn!(symbol = %symbol, range = %range, "no price data in range, skipping");
                    batch.skipped.push(symbol.clone());
                }
                Ok(series) => batch.series.push(series),
                Err(error) if error.kind() == SourceErrorKind::NotFound => {
                    warn!(symbol = %symbol, %error, "symbol not found, skipping");
                    batch.skipped.push(symbol.clone());
                }
                Err(error) => return Err(error),
            }
        }
        Ok(batch)
    }

    /// One snapshot per unique symbol; unknown symbols yield an all-absent snapshot.
    pub async fn snapshots(&self, symbols: &[Symbol]) -> Result<Vec<Snapshot>, SourceError> {
        let mut snapshots = Vec::with_capacity(symbols.len());
        for symbol in unique(symbols) {
            info!(provider = self.provider.name(), symbol = %symbol, "fetching snapshot");
            match self.provider.snapshot(symbol).await {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(error) if error.kind() == SourceErrorKind::NotFound => {
                    warn!(symbol = %symbol, %error, "no snapshot available");
                    snapshots.push(Snapshot::unavailable(symbol.clone()));
                }
                Err(error) => return Err(error),
            }
        }
        Ok(snapshots)
    }

    pub async fn portfolio(&self, symbols: &[Symbol]) -> Result<PortfolioSummary, SourceError> {
        let snapshots = self.snapshots(symbols).await?;
        Ok(PortfolioSummary::from_snapshots(&snapshots))
    }
}

fn unique(symbols: &[Symbol]) -> impl Iterator<Item = &Symbol> {
    let mut seen = HashSet::new();
    symbols.iter().filter(move |symbol| seen.insert(*symbol))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_keeps_first_occurrence_order() {
        let symbols = ["MSFT", "AAPL", "MSFT"]
            .iter()
            .map(|raw| Symbol::parse(raw).expect("valid"))
            .collect::<Vec<_>>();
        let ordered = unique(&symbols).map(Symbol::as_str).collect::<Vec<_>>();
        assert_eq!(ordered, vec!["MSFT", "AAPL"]);
    }

    #[test]
    fn empty_batch_has_no_rows() {
        let batch = HistoryBatch::empty();
        assert!(batch.is_empty());
        assert!(batch.history_rows().is_empty());
        assert!(batch.range().is_none());
    }
}
