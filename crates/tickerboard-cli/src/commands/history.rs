use serde::Serialize;

use tickerboard_core::{
    format, format_date, DateRange, MarketDataAggregator, MovingAverageTable, Symbol,
};

use crate::cli::HistoryArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{adjustment, resolve_range, resolve_symbols, skipped_warning, CommandResult, Context};

#[derive(Debug, Serialize)]
struct HistoryResponseData {
    range: DateRange,
    skipped: Vec<Symbol>,
    series: Vec<MovingAverageTable>,
}

pub async fn run(args: &HistoryArgs, context: &Context) -> Result<CommandResult, CliError> {
    let symbols = resolve_symbols(&args.selection, context).await?;
    let range = resolve_range(&args.range)?;
    let windows = if args.windows.is_empty() {
        context.settings.windows.clone()
    } else {
        args.windows.clone()
    };

    let provider = context.provider();
    let batch = MarketDataAggregator::new(&provider)
        .with_adjustment(adjustment(&args.range))
        .history(&symbols, range)
        .await?;

    let series = batch
        .series()
        .iter()
        .map(|series| MovingAverageTable::from_series(series, &windows))
        .collect::<Result<Vec<_>, _>>()?;

    let tables = series
        .iter()
        .map(|table| moving_average_table(table, range))
        .collect::<Vec<_>>();

    let mut result = CommandResult::ok(serde_json::to_value(HistoryResponseData {
        range,
        skipped: batch.skipped().to_vec(),
        series,
    })?);
    for table in tables {
        result = result.with_table(table);
    }
    if let Some(warning) = skipped_warning(batch.skipped()) {
        result = result.with_warning(warning);
    }
    Ok(result)
}

fn moving_average_table(table: &MovingAverageTable, range: DateRange) -> Table {
    let mut headers = vec![
        String::from("Date"),
        String::from("Close"),
        String::from("Change %"),
    ];
    headers.extend(table.windows.iter().map(|window| format!("MA{window}")));

    let title = format!("{} price history {range}", table.symbol);
    Table::with_columns(title, headers).with_rows(table.rows.iter().map(|row| {
        let mut cells = vec![
            format_date(row.date),
            format::price(Some(row.close)),
            format::percent(row.daily_change_percent),
        ];
        cells.extend(row.averages.iter().map(|average| format::price(*average)));
        cells
    }))
}
