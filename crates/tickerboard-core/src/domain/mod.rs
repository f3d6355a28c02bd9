//! # Domain Models
//!
//! Canonical domain types for tickerboard.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker symbol |
//! | [`TickerRecord`] | Index constituent (symbol + company name) |
//! | [`PriceBar`] | Daily OHLCV bar |
//! | [`PriceSeries`] | Bars for one symbol, ascending by date |
//! | [`Snapshot`] | Current price, previous close and market cap |
//! | [`DateRange`] | Calendar range, start inclusive, end exclusive |
//!
//! Prices are plain `f64`; missing provider figures are `Option::None` and are
//! never replaced by a default number.

pub(crate) mod date_range;
mod models;
mod symbol;

pub use date_range::{format_date, iso_date, parse_date, today_utc, DateRange};
pub use models::{PriceBar, PriceSeries, Snapshot, TickerRecord};
pub use symbol::Symbol;
