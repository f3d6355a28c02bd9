//! Derived metrics computed from price series and snapshots.
//!
//! Absent inputs stay absent: no metric here ever substitutes zero for a
//! missing figure.

use serde::Serialize;
use time::Date;

use crate::domain::iso_date;
use crate::{PriceSeries, Snapshot, Symbol, ValidationError};

/// Moving-average window sizes, in trading days.
pub const DEFAULT_WINDOWS: [usize; 2] = [20, 30];

/// Simple rolling mean over `closes`.
///
/// The output is aligned with the input; the first `window - 1` entries are
/// `None`.
pub fn moving_average(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>, ValidationError> {
    if window == 0 {
        return Err(ValidationError::ZeroWindow);
    }

    let mut averages = vec![None; closes.len()];
    for (offset, slice) in closes.windows(window).enumerate() {
        averages[offset + window - 1] = Some(slice.iter().sum::<f64>() / window as f64);
    }
    Ok(averages)
}

/// `(new - old) / old * 100`, or `None` when either side is absent or `old` is zero.
pub fn change_percent(new: Option<f64>, old: Option<f64>) -> Option<f64> {
    let (new, old) = (new?, old?);
    if old == 0.0 {
        return None;
    }
    Some((new - old) / old * 100.0)
}

/// Raw market capitalization in billions, rounded to two decimals.
pub fn market_cap_billions(market_cap: Option<f64>) -> Option<f64> {
    market_cap.map(|raw| (raw / 1e9 * 100.0).round() / 100.0)
}

/// One line of the portfolio summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioRow {
    pub ticker: Symbol,
    pub price: Option<f64>,
    pub previous_close: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_billions: Option<f64>,
    pub change_percent: Option<f64>,
}

impl PortfolioRow {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            ticker: snapshot.symbol.clone(),
            price: snapshot.current_price,
            previous_close: snapshot.previous_close,
            market_cap: snapshot.market_cap,
            market_cap_billions: market_cap_billions(snapshot.market_cap),
            change_percent: change_percent(snapshot.current_price, snapshot.previous_close),
        }
    }
}

/// Portfolio rows plus the mean change over the rows where it is defined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub rows: Vec<PortfolioRow>,
    pub average_change_percent: Option<f64>,
}

impl PortfolioSummary {
    pub fn from_snapshots(snapshots: &[Snapshot]) -> Self {
        let rows = snapshots
            .iter()
            .map(PortfolioRow::from_snapshot)
            .collect::<Vec<_>>();

        let defined = rows
            .iter()
            .filter_map(|row| row.change_percent)
            .collect::<Vec<_>>();
        let average_change_percent = if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum::<f64>() / defined.len() as f64)
        };

        Self {
            rows,
            average_change_percent,
        }
    }
}

/// A bar's close with its day-over-day change and one average per window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverageRow {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub close: f64,
    pub daily_change_percent: Option<f64>,
    /// Aligned with [`MovingAverageTable::windows`].
    pub averages: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverageTable {
    pub symbol: Symbol,
    pub windows: Vec<usize>,
    pub rows: Vec<MovingAverageRow>,
}

impl MovingAverageTable {
    pub fn from_series(series: &PriceSeries, windows: &[usize]) -> Result<Self, ValidationError> {
        let closes = series.closes();
        let columns = windows
            .iter()
            .map(|window| moving_average(&closes, *window))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = series
            .bars
            .iter()
            .enumerate()
            .map(|(index, bar)| {
                let previous = index.checked_sub(1).map(|prev| closes[prev]);
                MovingAverageRow {
                    date: bar.date,
                    close: bar.close,
                    daily_change_percent: change_percent(Some(bar.close), previous),
                    averages: columns.iter().map(|column| column[index]).collect(),
                }
            })
            .collect();

        Ok(Self {
            symbol: series.symbol.clone(),
            windows: windows.to_vec(),
            rows,
        })
    }

    /// Latest average for `window`, if the series is long enough.
    pub fn latest(&self, window: usize) -> Option<f64> {
        let column = self.windows.iter().position(|w| *w == window)?;
        self.rows.last()?.averages[column]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PriceBar;
    use time::macros::date;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value present");
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn moving_average_leaves_warmup_rows_empty() {
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        let averages = moving_average(&closes, 5).expect("window is valid");
        assert_eq!(averages.len(), 6);
        assert!(averages[..4].iter().all(Option::is_none));
        assert_close(averages[4], 12.0);
        assert_close(averages[5], 13.0);
    }

    #[test]
    fn moving_average_shorter_than_window_is_all_none() {
        let averages = moving_average(&[1.0, 2.0], 20).expect("window is valid");
        assert_eq!(averages, vec![None, None]);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert_eq!(moving_average(&[1.0], 0), Err(ValidationError::ZeroWindow));
    }

    #[test]
    fn change_percent_requires_both_sides_and_non_zero_base() {
        assert_eq!(change_percent(Some(150.0), Some(100.0)), Some(50.0));
        assert_eq!(change_percent(Some(150.0), Some(0.0)), None);
        assert_eq!(change_percent(Some(150.0), None), None);
        assert_eq!(change_percent(None, Some(100.0)), None);
    }

    #[test]
    fn market_cap_is_rounded_to_two_decimals() {
        assert_eq!(market_cap_billions(Some(2_345_678_900_000.0)), Some(2345.68));
        assert_eq!(market_cap_billions(None), None);
    }

    #[test]
    fn average_change_skips_undefined_rows() {
        let summary = PortfolioSummary::from_snapshots(&[
            Snapshot::new(symbol("AAPL"), Some(150.0), Some(100.0), None).expect("snapshot"),
            Snapshot::new(symbol("MSFT"), Some(90.0), Some(100.0), None).expect("snapshot"),
            Snapshot::unavailable(symbol("NVDA")),
        ]);
        assert_eq!(summary.rows.len(), 3);
        assert_eq!(summary.rows[2].change_percent, None);
        assert_close(summary.average_change_percent, 20.0);
    }

    #[test]
    fn average_change_is_none_without_defined_rows() {
        let summary = PortfolioSummary::from_snapshots(&[Snapshot::unavailable(symbol("NVDA"))]);
        assert_eq!(summary.average_change_percent, None);
    }

    #[test]
    fn table_carries_daily_change_and_averages() {
        let bars = [10.0, 12.0, 9.0]
            .iter()
            .enumerate()
            .map(|(day, close)| {
                let date = date!(2024 - 01 - 02) + time::Duration::days(day as i64);
                PriceBar::new(date, *close, *close, *close, *close, 100).expect("bar")
            })
            .collect();
        let series = PriceSeries::new(symbol("AAPL"), bars);

        let table = MovingAverageTable::from_series(&series, &[2]).expect("table");
        assert_eq!(table.rows[0].daily_change_percent, None);
        assert_close(table.rows[1].daily_change_percent, 20.0);
        assert_close(table.rows[2].daily_change_percent, -25.0);
        assert_eq!(table.rows[0].averages, vec![None]);
        assert_close(table.rows[1].averages[0], 11.0);
        assert_close(table.latest(2), 10.5);
        assert_eq!(table.latest(30), None);
    }
}
