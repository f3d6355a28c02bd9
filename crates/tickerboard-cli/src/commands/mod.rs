mod catalog;
mod daily;
mod export;
mod history;
mod summary;

use std::sync::Arc;

use serde_json::Value;
use tickerboard_core::{
    parse_date, today_utc, Adjustment, CachedCatalog, CatalogLoader, DateRange, HttpClient,
    ReqwestHttpClient, Settings, Symbol, YahooAdapter,
};
use tracing::debug;

use crate::cli::{Cli, Command, RangeArgs, SelectionArgs, DEFAULT_SYMBOLS};
use crate::error::CliError;
use crate::output::Table;

pub struct CommandResult {
    pub data: Value,
    pub tables: Vec<Table>,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            tables: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Settings and shared clients for one invocation.
///
/// The constituent catalog is loaded at most once per invocation, however
/// many steps ask for it.
pub struct Context {
    pub settings: Settings,
    http_client: Arc<dyn HttpClient>,
    catalog: CachedCatalog,
}

impl Context {
    pub fn new(cli: &Cli) -> Result<Self, CliError> {
        let mut settings = Settings::from_env()?;
        if let Some(timeout_ms) = cli.timeout_ms {
            if timeout_ms == 0 {
                return Err(CliError::Command(String::from(
                    "--timeout-ms must be greater than zero",
                )));
            }
            settings.timeout_ms = timeout_ms;
        }

        debug!(
            catalog_url = %settings.catalog_url,
            fallback_url = %settings.catalog_fallback_url,
            timeout_ms = settings.timeout_ms,
            "resolved settings"
        );

        let http_client = ReqwestHttpClient::new(&settings.user_agent)
            .map_err(|error| CliError::Command(error.to_string()))?;
        Ok(Self::with_http_client(settings, Arc::new(http_client)))
    }

    pub fn with_http_client(settings: Settings, http_client: Arc<dyn HttpClient>) -> Self {
        let catalog = CachedCatalog::new(CatalogLoader::from_settings(
            Arc::clone(&http_client),
            &settings,
        ));
        Self {
            settings,
            http_client,
            catalog,
        }
    }

    pub fn provider(&self) -> YahooAdapter {
        YahooAdapter::new(Arc::clone(&self.http_client)).with_timeout_ms(self.settings.timeout_ms)
    }

    pub const fn catalog(&self) -> &CachedCatalog {
        &self.catalog
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let context = Context::new(cli)?;

    match &cli.command {
        Command::Catalog(args) => catalog::run(args, &context).await,
        Command::Summary(args) => summary::run(args, &context).await,
        Command::History(args) => history::run(args, &context).await,
        Command::Export(args) => export::run(args, &context).await,
        Command::Daily(args) => daily::run(args, &context).await,
    }
}

/// Parsed selection, defaulting to the dashboard's starter symbols.
async fn resolve_symbols(
    selection: &SelectionArgs,
    context: &Context,
) -> Result<Vec<Symbol>, CliError> {
    let symbols = if selection.symbols.is_empty() {
        DEFAULT_SYMBOLS
            .iter()
            .map(|raw| Symbol::parse(raw))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        selection
            .symbols
            .iter()
            .map(|raw| Symbol::parse(raw))
            .collect::<Result<Vec<_>, _>>()?
    };

    if selection.check_catalog {
        let catalog = context.catalog().get().await?;
        let unknown = symbols
            .iter()
            .filter(|symbol| !catalog.contains(symbol))
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        if !unknown.is_empty() {
            return Err(CliError::UnknownSymbols(unknown));
        }
    }

    Ok(symbols)
}

fn resolve_range(args: &RangeArgs) -> Result<DateRange, CliError> {
    let range = match &args.end {
        Some(end) => DateRange::parse(&args.start, end)?,
        None => DateRange::new(parse_date(&args.start)?, today_utc())?,
    };
    Ok(range)
}

const fn adjustment(args: &RangeArgs) -> Adjustment {
    if args.raw {
        Adjustment::Raw
    } else {
        Adjustment::Adjusted
    }
}

fn skipped_warning(skipped: &[Symbol]) -> Option<String> {
    if skipped.is_empty() {
        return None;
    }
    let list = skipped
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("no data in range for: {list}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tickerboard_core::http_client::HttpFuture;
    use tickerboard_core::{HttpError, HttpRequest, HttpResponse};

    use super::*;
    use crate::cli::CatalogArgs;

    const PRIMARY_URL: &str = "https://listing.test/primary";
    const FALLBACK_URL: &str = "https://listing.test/constituents.csv";
    const PRIMARY_PAGE: &str = "<table>\
        <tr><th>Symbol</th><th>Security</th></tr>\
        <tr><td>AAPL</td><td>Apple Inc.</td></tr>\
        <tr><td>MSFT</td><td>Microsoft</td></tr>\
        </table>";

    /// Serves the primary listing and records every request.
    #[derive(Default)]
    struct ListingClient {
        requests: Mutex<Vec<String>>,
    }

    impl ListingClient {
        fn requests(&self) -> Vec<String> {
            self.requests.lock().expect("request log").clone()
        }
    }

    impl HttpClient for ListingClient {
        fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
            Box::pin(async move {
                self.requests
                    .lock()
                    .expect("request log")
                    .push(request.url.clone());
                if request.url == PRIMARY_URL {
                    Ok(HttpResponse::with_status(200, PRIMARY_PAGE))
                } else {
                    Err(HttpError::new(format!("unscripted url {}", request.url)))
                }
            })
        }
    }

    fn context(client: &Arc<ListingClient>) -> Context {
        let settings = Settings {
            catalog_url: PRIMARY_URL.to_owned(),
            catalog_fallback_url: FALLBACK_URL.to_owned(),
            ..Settings::default()
        };
        Context::with_http_client(settings, client.clone())
    }

    #[tokio::test]
    async fn catalog_is_fetched_once_per_invocation() {
        // Given: A context whose listing is served by a recording client
        let client = Arc::new(ListingClient::default());
        let context = context(&client);
        let selection = SelectionArgs {
            symbols: vec![String::from("msft")],
            check_catalog: true,
        };

        // When: The selection is checked and the catalog is listed afterwards
        let symbols = resolve_symbols(&selection, &context)
            .await
            .expect("known symbol");
        let listed = catalog::run(
            &CatalogArgs {
                search: None,
                limit: None,
            },
            &context,
        )
        .await
        .expect("catalog listed");

        // Then: Both steps share a single fetch of the primary listing
        assert_eq!(symbols, vec![Symbol::parse("MSFT").expect("valid symbol")]);
        assert_eq!(listed.data["total"], 2);
        assert_eq!(client.requests(), vec![PRIMARY_URL.to_owned()]);
        assert!(context.catalog().is_loaded());
    }

    #[tokio::test]
    async fn unknown_symbol_is_rejected_by_catalog_check() {
        let client = Arc::new(ListingClient::default());
        let context = context(&client);
        let selection = SelectionArgs {
            symbols: vec![String::from("AAPL"), String::from("ZZZZ")],
            check_catalog: true,
        };

        let error = resolve_symbols(&selection, &context)
            .await
            .expect_err("ZZZZ is not listed");

        let CliError::UnknownSymbols(unknown) = error else {
            panic!("expected unknown symbols error");
        };
        assert_eq!(unknown, vec!["ZZZZ"]);
    }
}
