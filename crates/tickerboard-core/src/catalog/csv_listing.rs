//! Constituents extraction from the fallback CSV listing.

use crate::CatalogError;

/// Extract `(symbol, name)` pairs from a CSV listing.
///
/// Accepts a `Symbol` column paired with `Name` or, failing that, with
/// `Security`. `Name` is checked first. Any other layout is rejected.
pub fn parse_listing(source_url: &str, body: &str) -> Result<Vec<(String, String)>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| CatalogError::Parse(format!("{source_url}: {error}")))?
        .clone();
    let position = |name: &str| headers.iter().position(|header| header == name);

    let schema_mismatch = || CatalogError::SchemaMismatch {
        source_url: source_url.to_owned(),
        found: headers.iter().collect::<Vec<_>>().join(", "),
    };
    let symbol_column = position("Symbol").ok_or_else(schema_mismatch)?;
    let name_column = position("Name")
        .or_else(|| position("Security"))
        .ok_or_else(schema_mismatch)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|error| CatalogError::Parse(format!("{source_url}: {error}")))?;
        let Some(symbol) = record.get(symbol_column) else {
            continue;
        };
        let name = record.get(name_column).unwrap_or_default();
        rows.push((symbol.to_owned(), name.to_owned()));
    }
    Ok(rows)
}
