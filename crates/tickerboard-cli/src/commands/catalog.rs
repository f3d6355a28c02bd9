use serde::Serialize;

use tickerboard_core::{CatalogSource, TickerRecord};

use crate::cli::CatalogArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct CatalogResponseData<'a> {
    source: CatalogSource,
    total: usize,
    query: Option<&'a str>,
    records: Vec<&'a TickerRecord>,
}

pub async fn run(args: &CatalogArgs, context: &Context) -> Result<CommandResult, CliError> {
    if args.limit == Some(0) {
        return Err(CliError::Command(String::from(
            "--limit must be greater than zero",
        )));
    }

    let catalog = context.catalog().get().await?;

    let query = args
        .search
        .as_deref()
        .map(str::trim)
        .filter(|query| !query.is_empty());
    let mut records = match query {
        Some(query) => catalog.search(query),
        None => catalog.records().iter().collect(),
    };
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    let table = Table::new(
        format!("S&P 500 constituents ({} shown)", records.len()),
        ["Symbol", "Security"],
    )
    .with_rows(
        records
            .iter()
            .map(|record| vec![record.symbol.to_string(), record.name.clone()]),
    );

    let mut result = CommandResult::ok(serde_json::to_value(CatalogResponseData {
        source: catalog.source(),
        total: catalog.len(),
        query,
        records,
    })?)
    .with_table(table);
    if catalog.source() == CatalogSource::Fallback {
        result = result.with_warning("primary listing unavailable; using fallback CSV source");
    }
    Ok(result)
}
