use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::date_range::iso_date;
use crate::{Symbol, ValidationError};

/// Index constituent as listed by a catalog source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRecord {
    pub symbol: Symbol,
    /// Company name; empty when the source omits it.
    pub name: String,
}

impl TickerRecord {
    pub fn new(symbol: Symbol, name: impl Into<String>) -> Self {
        Self {
            symbol,
            name: name.into().trim().to_owned(),
        }
    }
}

/// Daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Build a bar, rejecting non-finite prices.
    ///
    /// Provider data is taken as-is otherwise: high/low ordering is not checked.
    pub fn new(
        date: Date,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_finite("open", open)?;
        validate_finite("high", high)?;
        validate_finite("low", low)?;
        validate_finite("close", close)?;

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Daily bars for one symbol, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series; bars are sorted by date and same-day duplicates dropped.
    pub fn new(symbol: Symbol, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|bar| bar.date);
        bars.dedup_by_key(|bar| bar.date);
        Self { symbol, bars }
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            bars: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }
}

/// Point-in-time price and size information for a symbol.
///
/// Every figure is optional; absent values stay `None` all the way to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub symbol: Symbol,
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub market_cap: Option<f64>,
}

impl Snapshot {
    pub fn new(
        symbol: Symbol,
        current_price: Option<f64>,
        previous_close: Option<f64>,
        market_cap: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_optional_non_negative("current_price", current_price)?;
        validate_optional_non_negative("previous_close", previous_close)?;
        validate_optional_non_negative("market_cap", market_cap)?;

        Ok(Self {
            symbol,
            current_price,
            previous_close,
            market_cap,
        })
    }

    /// Snapshot with every figure absent.
    pub fn unavailable(symbol: Symbol) -> Self {
        Self {
            symbol,
            current_price: None,
            previous_close: None,
            market_cap: None,
        }
    }
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_finite(field, value)?;
        if value < 0.0 {
            return Err(ValidationError::NegativeValue { field });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn rejects_non_finite_bar_prices() {
        let err = PriceBar::new(date!(2024 - 01 - 02), 1.0, f64::NAN, 1.0, 1.0, 10)
            .expect_err("must fail");
        assert_eq!(err, ValidationError::NonFiniteValue { field: "high" });
    }

    #[test]
    fn series_sorts_and_dedups_bars() {
        let bar = |d: Date, close: f64| PriceBar::new(d, close, close, close, close, 1).expect("bar");
        let series = PriceSeries::new(
            symbol("AAPL"),
            vec![
                bar(date!(2024 - 01 - 03), 2.0),
                bar(date!(2024 - 01 - 02), 1.0),
                bar(date!(2024 - 01 - 03), 9.0),
            ],
        );
        assert_eq!(series.closes(), vec![1.0, 2.0]);
    }

    #[test]
    fn snapshot_rejects_negative_market_cap() {
        let err = Snapshot::new(symbol("MSFT"), Some(1.0), None, Some(-5.0)).expect_err("must fail");
        assert_eq!(err, ValidationError::NegativeValue { field: "market_cap" });
    }

    #[test]
    fn unavailable_snapshot_has_no_figures() {
        let snapshot = Snapshot::unavailable(symbol("NVDA"));
        assert!(snapshot.current_price.is_none());
        assert!(snapshot.previous_close.is_none());
        assert!(snapshot.market_cap.is_none());
    }
}
