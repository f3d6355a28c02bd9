//! Write history extracts for the selected symbols to CSV files.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use tickerboard_core::export::{self, HISTORY_FILE, OPEN_CLOSE_FILE, PORTFOLIO_FILE};
use tickerboard_core::{DateRange, MarketDataAggregator, Symbol};

use crate::cli::ExportArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{adjustment, resolve_range, resolve_symbols, skipped_warning, CommandResult, Context};

#[derive(Debug, Serialize)]
struct ExportedFile {
    path: PathBuf,
    rows: usize,
}

#[derive(Debug, Serialize)]
struct ExportResponseData {
    range: DateRange,
    skipped: Vec<Symbol>,
    files: Vec<ExportedFile>,
}

pub async fn run(args: &ExportArgs, context: &Context) -> Result<CommandResult, CliError> {
    let symbols = resolve_symbols(&args.selection, context).await?;
    let range = resolve_range(&args.range)?;
    fs::create_dir_all(&args.out_dir)?;

    let provider = context.provider();
    let aggregator =
        MarketDataAggregator::new(&provider).with_adjustment(adjustment(&args.range));
    let batch = aggregator.history(&symbols, range).await?;

    let mut files = Vec::new();
    let mut warnings = Vec::new();

    let history_rows = batch.history_rows();
    let path = args.out_dir.join(HISTORY_FILE);
    export::write_history_csv(&path, &history_rows)?;
    files.push(ExportedFile {
        path,
        rows: history_rows.len(),
    });

    let open_close_rows = batch.open_close_rows();
    let path = args.out_dir.join(OPEN_CLOSE_FILE);
    if export::write_open_close_csv(&path, &open_close_rows)? {
        files.push(ExportedFile {
            path,
            rows: open_close_rows.len(),
        });
    } else {
        warnings.push(String::from("no open/close rows; skipped open/close export"));
    }

    for symbol in batch.symbols() {
        let Some(rows) = batch.close_history(&symbol) else {
            continue;
        };
        let path = args.out_dir.join(export::close_history_file_name(&symbol));
        export::write_close_history_csv(&path, &rows)?;
        files.push(ExportedFile {
            path,
            rows: rows.len(),
        });
    }

    if args.portfolio {
        let summary = aggregator.portfolio(&symbols).await?;
        let path = args.out_dir.join(PORTFOLIO_FILE);
        export::write_portfolio_csv(&path, &summary)?;
        files.push(ExportedFile {
            path,
            rows: summary.rows.len(),
        });
    }

    warnings.extend(skipped_warning(batch.skipped()));

    let table = Table::new(format!("Exported files {range}"), ["File", "Rows"]).with_rows(
        files
            .iter()
            .map(|file| vec![file.path.display().to_string(), file.rows.to_string()]),
    );
    let mut result = CommandResult::ok(serde_json::to_value(ExportResponseData {
        range,
        skipped: batch.skipped().to_vec(),
        files,
    })?)
    .with_table(table);
    for warning in warnings {
        result = result.with_warning(warning);
    }
    Ok(result)
}
