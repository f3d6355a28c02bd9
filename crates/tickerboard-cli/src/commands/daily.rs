use std::path::Path;

use serde::Serialize;

use tickerboard_core::daily::{self, DailyReport};
use tickerboard_core::{export, format, format_date, parse_date, TickerList};

use crate::cli::DailyArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{skipped_warning, CommandResult, Context};

#[derive(Debug, Serialize)]
struct DailyResponseData<'a> {
    output: &'a Path,
    written: bool,
    report: &'a DailyReport,
}

pub async fn run(args: &DailyArgs, context: &Context) -> Result<CommandResult, CliError> {
    let tickers = TickerList::from_path(&args.tickers)?;
    let day = match &args.date {
        Some(raw) => parse_date(raw)?,
        None => daily::yesterday_utc(),
    };

    let provider = context.provider();
    let report = daily::collect_open_close(&provider, tickers.symbols(), day).await?;
    let written = export::write_open_close_xlsx(&args.output, &report.rows)?;

    let table = Table::new(
        format!("Open/close for {}", format_date(day)),
        ["Date", "Ticker", "Open", "Close"],
    )
    .with_rows(report.rows.iter().map(|row| {
        vec![
            format_date(row.date),
            row.ticker.to_string(),
            format::price(Some(row.open)),
            format::price(Some(row.close)),
        ]
    }));

    let mut result = CommandResult::ok(serde_json::to_value(DailyResponseData {
        output: &args.output,
        written,
        report: &report,
    })?)
    .with_table(table);
    if !written {
        result = result.with_warning(format!(
            "no data for {}; {} not written",
            format_date(day),
            args.output.display()
        ));
    }
    if let Some(warning) = skipped_warning(&report.skipped) {
        result = result.with_warning(warning);
    }
    Ok(result)
}
