use thiserror::Error;

/// Validation and contract errors exposed by `tickerboard-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("date range start {start} must be before end {end}")]
    EmptyDateRange { start: String, end: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("moving average window must be greater than zero")]
    ZeroWindow,
}

/// Errors raised while loading the ticker catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The fallback listing has neither a `Symbol`/`Name` nor a `Symbol`/`Security` column pair.
    #[error("catalog source '{source_url}' does not contain expected columns (found: {found})")]
    SchemaMismatch { source_url: String, found: String },

    #[error("catalog sources unreachable: primary: {primary}; fallback: {fallback}")]
    Unavailable { primary: String, fallback: String },

    #[error("catalog source '{source_url}' listed no usable symbols")]
    EmptyListing { source_url: String },

    #[error("catalog parse error: {0}")]
    Parse(String),
}

impl CatalogError {
    /// True when a source answered but its content could not be used.
    pub const fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::SchemaMismatch { .. } | Self::EmptyListing { .. } | Self::Parse(_)
        )
    }
}

/// Errors raised while writing export files.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("csv export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet export error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

/// Errors raised while reading configuration inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
