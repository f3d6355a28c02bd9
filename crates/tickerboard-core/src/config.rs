//! Runtime settings and the daily ticker list.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TICKERBOARD_CATALOG_URL` | [`DEFAULT_CATALOG_URL`] |
//! | `TICKERBOARD_CATALOG_FALLBACK_URL` | [`DEFAULT_CATALOG_FALLBACK_URL`] |
//! | `TICKERBOARD_USER_AGENT` | [`DEFAULT_USER_AGENT`] |
//! | `TICKERBOARD_TIMEOUT_MS` | [`DEFAULT_TIMEOUT_MS`] |

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::analytics::DEFAULT_WINDOWS;
use crate::http_client::{DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
use crate::{ConfigError, Symbol};

pub const DEFAULT_CATALOG_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";
pub const DEFAULT_CATALOG_FALLBACK_URL: &str =
    "https://datahub.io/core/s-and-p-500-companies/r/constituents.csv";

pub const ENV_CATALOG_URL: &str = "TICKERBOARD_CATALOG_URL";
pub const ENV_CATALOG_FALLBACK_URL: &str = "TICKERBOARD_CATALOG_FALLBACK_URL";
pub const ENV_USER_AGENT: &str = "TICKERBOARD_USER_AGENT";
pub const ENV_TIMEOUT_MS: &str = "TICKERBOARD_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub catalog_url: String,
    pub catalog_fallback_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
    pub windows: Vec<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_owned(),
            catalog_fallback_url: DEFAULT_CATALOG_FALLBACK_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            windows: DEFAULT_WINDOWS.to_vec(),
        }
    }
}

impl Settings {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`; blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let mut settings = Self::default();
        if let Some(url) = read(ENV_CATALOG_URL) {
            settings.catalog_url = url;
        }
        if let Some(url) = read(ENV_CATALOG_FALLBACK_URL) {
            settings.catalog_fallback_url = url;
        }
        if let Some(user_agent) = read(ENV_USER_AGENT) {
            settings.user_agent = user_agent;
        }
        if let Some(value) = read(ENV_TIMEOUT_MS) {
            settings.timeout_ms = match value.parse::<u64>() {
                Ok(timeout_ms) if timeout_ms > 0 => timeout_ms,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: ENV_TIMEOUT_MS,
                        value,
                    })
                }
            };
        }
        Ok(settings)
    }
}

/// Ordered ticker list read from a JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerList(Vec<Symbol>);

impl TickerList {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let body = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&display, &body)
    }

    pub fn from_json(path: &str, body: &str) -> Result<Self, ConfigError> {
        let raw: Vec<String> = serde_json::from_str(body).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        let symbols = raw
            .iter()
            .map(|value| Symbol::parse(value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(symbols))
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn into_symbols(self) -> Vec<Symbol> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
