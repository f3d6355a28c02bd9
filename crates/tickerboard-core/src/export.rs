//! CSV and spreadsheet writers for the derived tables.
//!
//! | Writer | Header | Default file |
//! |--------|--------|--------------|
//! | [`write_history_csv`] | `Date,Ticker,Open,High,Low,Close,Volume` | [`HISTORY_FILE`] |
//! | [`write_open_close_csv`] | `Date,Ticker,Open,Close` | [`OPEN_CLOSE_FILE`] |
//! | [`write_close_history_csv`] | `Date,Close` | [`close_history_file_name`] |
//! | [`write_portfolio_csv`] | `Ticker,Price,Previous Close,Market Cap (B),Change %` | [`PORTFOLIO_FILE`] |
//! | [`write_open_close_xlsx`] | `Date, Ticker, Open, Close` | [`DAILY_XLSX_FILE`] |

use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::aggregator::{CloseRow, HistoryRow, OpenCloseRow};
use crate::analytics::PortfolioSummary;
use crate::{format_date, ExportError, Symbol};

pub const HISTORY_FILE: &str = "selected_stocks_data.csv";
pub const OPEN_CLOSE_FILE: &str = "open_close_selected_tickers.csv";
pub const PORTFOLIO_FILE: &str = "portfolio_summary.csv";
pub const DAILY_XLSX_FILE: &str = "daily_open_close.xlsx";

const XLSX_HEADER: [&str; 4] = ["Date", "Ticker", "Open", "Close"];

/// `{TICKER}_historical.csv`
pub fn close_history_file_name(symbol: &Symbol) -> String {
    format!("{symbol}_historical.csv")
}

pub fn write_history_csv(path: &Path, rows: &[HistoryRow]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Date", "Ticker", "Open", "High", "Low", "Close", "Volume"])?;
    for row in rows {
        writer.write_record([
            format_date(row.date),
            row.ticker.to_string(),
            row.open.to_string(),
            row.high.to_string(),
            row.low.to_string(),
            row.close.to_string(),
            row.volume.to_string(),
        ])?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote history csv");
    Ok(())
}

/// Returns `false` without creating the file when `rows` is empty.
pub fn write_open_close_csv(path: &Path, rows: &[OpenCloseRow]) -> Result<bool, ExportError> {
    if rows.is_empty() {
        return Ok(false);
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Date", "Ticker", "Open", "Close"])?;
    for row in rows {
        writer.write_record([
            format_date(row.date),
            row.ticker.to_string(),
            row.open.to_string(),
            row.close.to_string(),
        ])?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote open/close csv");
    Ok(true)
}

pub fn write_close_history_csv(path: &Path, rows: &[CloseRow]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Date", "Close"])?;
    for row in rows {
        writer.write_record([format_date(row.date), row.close.to_string()])?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote close history csv");
    Ok(())
}

/// Absent figures are written as empty cells.
pub fn write_portfolio_csv(path: &Path, summary: &PortfolioSummary) -> Result<(), ExportError> {
    let cell = |value: Option<f64>| value.map(|value| value.to_string()).unwrap_or_default();

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Ticker",
        "Price",
        "Previous Close",
        "Market Cap (B)",
        "Change %",
    ])?;
    for row in &summary.rows {
        writer.write_record([
            row.ticker.to_string(),
            cell(row.price),
            cell(row.previous_close),
            cell(row.market_cap_billions),
            cell(row.change_percent),
        ])?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = summary.rows.len(), "wrote portfolio csv");
    Ok(())
}

/// Returns `false` without creating the file when `rows` is empty.
pub fn write_open_close_xlsx(path: &Path, rows: &[OpenCloseRow]) -> Result<bool, ExportError> {
    if rows.is_empty() {
        return Ok(false);
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (column, title) in (0u16..).zip(XLSX_HEADER) {
        worksheet.write_string(0, column, title)?;
    }
    for (line, row) in (1u32..).zip(rows) {
        worksheet.write_string(line, 0, format_date(row.date))?;
        worksheet.write_string(line, 1, row.ticker.as_str())?;
        worksheet.write_number(line, 2, row.open)?;
        worksheet.write_number(line, 3, row.close)?;
    }
    workbook.save(path)?;
    info!(path = %path.display(), rows = rows.len(), "wrote open/close spreadsheet");
    Ok(true)
}
