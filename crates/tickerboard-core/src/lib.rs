//! # Tickerboard Core
//!
//! Ticker catalog loading and market data aggregation for the tickerboard
//! stock dashboard.
//!
//! ## Overview
//!
//! - **Ticker catalog** loaded from an HTML listing page with a CSV fallback
//! - **Market data provider** contract with a Yahoo Finance adapter
//! - **Aggregator** assembling history batches, snapshots and portfolio summaries
//! - **Derived metrics**: moving averages, percent changes, market cap in billions
//! - **Exporters** for CSV files and the daily spreadsheet
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo) |
//! | [`aggregator`] | Per-symbol fetching and derived tables |
//! | [`analytics`] | Moving averages, change percent, portfolio summary |
//! | [`catalog`] | Ticker catalog loader and memo |
//! | [`config`] | Settings and ticker list |
//! | [`daily`] | Daily open/close batch |
//! | [`data_source`] | Provider trait and error types |
//! | [`domain`] | Domain models (Symbol, PriceBar, Snapshot) |
//! | [`error`] | Core error types |
//! | [`export`] | CSV and XLSX writers |
//! | [`format`] | Display helpers for optional figures |
//! | [`http_client`] | HTTP client abstraction |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickerboard_core::{DateRange, MarketDataAggregator, ReqwestHttpClient, Symbol, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = Arc::new(ReqwestHttpClient::new(tickerboard_core::http_client::DEFAULT_USER_AGENT)?);
//!     let provider = YahooAdapter::new(http);
//!     let aggregator = MarketDataAggregator::new(&provider);
//!
//!     let symbols = vec![Symbol::parse("AAPL")?, Symbol::parse("MSFT")?];
//!     let batch = aggregator
//!         .history(&symbols, DateRange::parse("2024-01-02", "2024-02-01")?)
//!         .await?;
//!
//!     for series in batch.series() {
//!         println!("{}: {} bars", series.symbol, series.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └───┬─────────┬───┘
//!     │         │
//!     ▼         ▼
//! ┌────────┐ ┌─────────────────┐     ┌──────────────────┐
//! │Catalog │ │ Aggregator      │────▶│ Analytics        │
//! │Loader  │ └────────┬────────┘     └──────────────────┘
//! └───┬────┘          │
//!     │               ▼
//!     │      ┌─────────────────┐
//!     │      │ Data Provider   │
//!     │      │ (Yahoo adapter) │
//!     │      └────────┬────────┘
//!     ▼               ▼
//! ┌──────────────────────────┐
//! │ HTTP Client (reqwest)    │
//! └──────────────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns a `Result`:
//!
//! ```rust
//! use tickerboard_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::NotFound => "symbol skipped",
//!         SourceErrorKind::RateLimited => "try again later",
//!         _ => "provider failure",
//!     }
//! }
//! ```

pub mod adapters;
pub mod aggregator;
pub mod analytics;
pub mod catalog;
pub mod config;
pub mod daily;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod export;
pub mod format;
pub mod http_client;

// Adapter implementations
pub use adapters::{YahooAdapter, YahooAuthManager};

// Aggregation and derived tables
pub use aggregator::{CloseRow, HistoryBatch, HistoryRow, MarketDataAggregator, OpenCloseRow};
pub use analytics::{
    MovingAverageRow, MovingAverageTable, PortfolioRow, PortfolioSummary, DEFAULT_WINDOWS,
};

// Catalog
pub use catalog::{CachedCatalog, Catalog, CatalogLoader, CatalogSource};

// Configuration
pub use config::{Settings, TickerList};

// Daily batch
pub use daily::DailyReport;

// Data source trait and types
pub use data_source::{Adjustment, MarketDataProvider, SourceError, SourceErrorKind};

// Domain models
pub use domain::{
    format_date, parse_date, today_utc, DateRange, PriceBar, PriceSeries, Snapshot, Symbol,
    TickerRecord,
};

// Error types
pub use error::{CatalogError, ConfigError, ExportError, ValidationError};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
