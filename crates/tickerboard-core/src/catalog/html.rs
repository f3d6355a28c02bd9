//! Constituents table extraction from the primary HTML listing page.

use scraper::{ElementRef, Html, Selector};

const SYMBOL_HEADERS: [&str; 3] = ["Symbol", "Ticker symbol", "Ticker"];
const NAME_HEADERS: [&str; 3] = ["Security", "Name", "Company"];

/// Extract `(symbol, name)` pairs from the first `<table>` of `body`.
///
/// The header row is the first row carrying `<th>` cells, or the first row
/// when the table has none.
pub fn parse_first_table(body: &str) -> Result<Vec<(String, String)>, String> {
    let document = Html::parse_document(body);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("th, td")?;
    let header_cell_selector = selector("th")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| String::from("no table found in listing page"))?;

    let rows = table.select(&row_selector).collect::<Vec<_>>();
    let header_index = rows
        .iter()
        .position(|row| row.select(&header_cell_selector).next().is_some())
        .unwrap_or(0);
    let header_row = rows
        .get(header_index)
        .ok_or_else(|| String::from("listing table has no rows"))?;

    let headers = cells(header_row, &cell_selector);
    let symbol_column = find_column(&headers, &SYMBOL_HEADERS)
        .ok_or_else(|| format!("no symbol column in table headers {headers:?}"))?;
    let name_column = find_column(&headers, &NAME_HEADERS)
        .ok_or_else(|| format!("no name column in table headers {headers:?}"))?;

    Ok(rows
        .iter()
        .skip(header_index + 1)
        .filter_map(|row| {
            let values = cells(row, &cell_selector);
            let symbol = values.get(symbol_column)?.clone();
            let name = values.get(name_column).cloned().unwrap_or_default();
            Some((symbol, name))
        })
        .collect())
}

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|error| format!("invalid selector '{css}': {error}"))
}

fn cells(row: &ElementRef<'_>, cell_selector: &Selector) -> Vec<String> {
    row.select(cell_selector)
        .map(|cell| {
            cell.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(candidate))
    })
}
