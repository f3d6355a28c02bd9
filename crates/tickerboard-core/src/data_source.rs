//! Market data provider contract.
//!
//! | Operation | Input | Output |
//! |-----------|-------|--------|
//! | `history` | [`Symbol`] + [`DateRange`] | [`PriceSeries`] |
//! | `snapshot` | [`Symbol`] | [`Snapshot`] |
//!
//! Providers fetch one symbol per call. Batching and the per-symbol skip
//! policy live in [`crate::aggregator`].

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{DateRange, PriceSeries, Snapshot, Symbol};

/// Whether historical prices are adjusted for splits and dividends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// OHLC scaled by the adjusted-close factor of each bar.
    #[default]
    Adjusted,
    /// Prices as traded.
    Raw,
}

/// Provider error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Symbol unknown to the provider, or no data for it.
    NotFound,
    Unavailable,
    RateLimited,
    InvalidRequest,
    Internal,
}

/// Structured provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Internal, message)
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Adapter contract for price history and snapshot lookups.
pub trait MarketDataProvider: Send + Sync {
    /// Provider name used in logs and output metadata.
    fn name(&self) -> &'static str;

    /// Daily bars for `symbol` within `range` (start inclusive, end exclusive).
    ///
    /// An empty series is a valid answer.
    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: DateRange,
        adjustment: Adjustment,
    ) -> SourceFuture<'a, PriceSeries>;

    fn snapshot<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, Snapshot>;
}

impl<T: MarketDataProvider + ?Sized> MarketDataProvider for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: DateRange,
        adjustment: Adjustment,
    ) -> SourceFuture<'a, PriceSeries> {
        (**self).history(symbol, range, adjustment)
    }

    fn snapshot<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, Snapshot> {
        (**self).snapshot(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_follow_kind() {
        assert_eq!(SourceError::not_found("x").code(), "source.not_found");
        assert_eq!(SourceError::rate_limited("x").code(), "source.rate_limited");
        assert_eq!(
            SourceError::unavailable("down").to_string(),
            "down (source.unavailable)"
        );
    }

    #[test]
    fn adjusted_prices_are_the_default() {
        assert_eq!(Adjustment::default(), Adjustment::Adjusted);
    }
}
