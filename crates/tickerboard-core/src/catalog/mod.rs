//! # Ticker Catalog
//!
//! Loads the current index constituents from the primary HTML listing page
//! and falls back to a CSV listing when the primary cannot be used.
//!
//! ```text
//! primary (HTML table) ──ok──▶ Catalog { source: Primary }
//!        │
//!      error (transport, status, no table, no columns, no rows)
//!        ▼
//! fallback (CSV: Symbol + Name | Symbol + Security) ──▶ Catalog { source: Fallback }
//!        │
//!      error ──▶ CatalogError
//! ```
//!
//! [`CachedCatalog`] memoizes one successful load for the lifetime of the
//! value; callers hold it and pass it by reference.

mod csv_listing;
mod html;

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub use csv_listing::parse_listing;
pub use html::parse_first_table;

use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::{CatalogError, Settings, Symbol, TickerRecord};

/// Which source produced a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    Primary,
    Fallback,
}

/// Index constituents with unique, non-empty symbols in listing order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    source: CatalogSource,
    records: Vec<TickerRecord>,
}

impl Catalog {
    /// Build a catalog from raw `(symbol, name)` pairs.
    ///
    /// Invalid symbols are dropped; for duplicated symbols the first row wins.
    pub fn from_rows(source: CatalogSource, rows: Vec<(String, String)>) -> Self {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(rows.len());
        for (raw_symbol, name) in rows {
            match Symbol::parse(&raw_symbol) {
                Ok(symbol) if seen.insert(symbol.clone()) => {
                    records.push(TickerRecord::new(symbol, name));
                }
                Ok(symbol) => debug!(symbol = %symbol, "dropping duplicate catalog symbol"),
                Err(error) => debug!(raw_symbol = %raw_symbol, %error, "dropping invalid catalog symbol"),
            }
        }
        Self { source, records }
    }

    pub const fn source(&self) -> CatalogSource {
        self.source
    }

    pub fn records(&self) -> &[TickerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.records
            .iter()
            .map(|record| record.symbol.clone())
            .collect()
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&TickerRecord> {
        self.records.iter().find(|record| &record.symbol == symbol)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.get(symbol).is_some()
    }

    /// Case-insensitive match on symbol or company name.
    pub fn search(&self, query: &str) -> Vec<&TickerRecord> {
        let query = query.trim().to_lowercase();
        self.records
            .iter()
            .filter(|record| {
                record.symbol.as_str().to_lowercase().contains(&query)
                    || record.name.to_lowercase().contains(&query)
            })
            .collect()
    }
}

/// Fetches the catalog from the primary source, falling back to the CSV listing.
#[derive(Clone)]
pub struct CatalogLoader {
    http_client: Arc<dyn HttpClient>,
    primary_url: String,
    fallback_url: String,
    timeout_ms: u64,
}

impl CatalogLoader {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        primary_url: impl Into<String>,
        fallback_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            primary_url: primary_url.into(),
            fallback_url: fallback_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn from_settings(http_client: Arc<dyn HttpClient>, settings: &Settings) -> Self {
        Self::new(
            http_client,
            settings.catalog_url.clone(),
            settings.catalog_fallback_url.clone(),
        )
        .with_timeout_ms(settings.timeout_ms)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Load the catalog; fails only when both sources are unusable.
    pub async fn load(&self) -> Result<Catalog, CatalogError> {
        let primary_error = match self.load_primary().await {
            Ok(catalog) => {
                info!(count = catalog.len(), "loaded ticker catalog from primary source");
                return Ok(catalog);
            }
            Err(reason) => reason,
        };

        warn!(url = %self.primary_url, reason = %primary_error, "primary catalog fetch failed");
        info!(url = %self.fallback_url, "falling back to CSV catalog source");

        let catalog = self.load_fallback(&primary_error).await?;
        info!(count = catalog.len(), "loaded ticker catalog from fallback source");
        Ok(catalog)
    }

    async fn load_primary(&self) -> Result<Catalog, String> {
        let body = self.fetch(&self.primary_url).await?;
        let rows = parse_first_table(&body)?;
        let catalog = Catalog::from_rows(CatalogSource::Primary, rows);
        if catalog.is_empty() {
            return Err(String::from("listing table has no usable rows"));
        }
        Ok(catalog)
    }

    async fn load_fallback(&self, primary_error: &str) -> Result<Catalog, CatalogError> {
        let body = self
            .fetch(&self.fallback_url)
            .await
            .map_err(|fallback| CatalogError::Unavailable {
                primary: primary_error.to_owned(),
                fallback,
            })?;

        let rows = parse_listing(&self.fallback_url, &body)?;
        let catalog = Catalog::from_rows(CatalogSource::Fallback, rows);
        if catalog.is_empty() {
            return Err(CatalogError::EmptyListing {
                source_url: self.fallback_url.clone(),
            });
        }
        Ok(catalog)
    }

    async fn fetch(&self, url: &str) -> Result<String, String> {
        let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| error.message().to_owned())?;
        if !response.is_success() {
            return Err(format!("{url} returned status {}", response.status));
        }
        Ok(response.body)
    }
}

/// A catalog loaded at most once per value.
///
/// Concurrent or repeated calls to [`CachedCatalog::get`] share the first
/// successful load. A failed load is not cached.
pub struct CachedCatalog {
    loader: CatalogLoader,
    cell: OnceCell<Catalog>,
}

impl CachedCatalog {
    pub fn new(loader: CatalogLoader) -> Self {
        Self {
            loader,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<&Catalog, CatalogError> {
        self.cell.get_or_try_init(|| self.loader.load()).await
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}
