use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

/// A titled text table with optional footer lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub footer: Vec<String>,
}

impl Table {
    pub fn new<const N: usize>(title: impl Into<String>, headers: [&str; N]) -> Self {
        Self::with_columns(title, headers.iter().map(|header| header.to_string()).collect())
    }

    pub fn with_columns(title: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            title: title.into(),
            headers,
            rows: Vec::new(),
            footer: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Vec<String>>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn with_footer(mut self, line: impl Into<String>) -> Self {
        self.footer.push(line.into());
        self
    }

    /// Columns padded to their widest cell, separated by two spaces.
    pub fn to_text(&self) -> String {
        let mut widths = self
            .headers
            .iter()
            .map(|header| header.chars().count())
            .collect::<Vec<_>>();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(index) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_owned()
        };

        let mut text = format!("{}\n", self.title);
        text.push_str(&line(&self.headers));
        text.push('\n');
        let rule = widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  ");
        text.push_str(&rule);
        text.push('\n');
        for row in &self.rows {
            text.push_str(&line(row));
            text.push('\n');
        }
        for footer in &self.footer {
            text.push_str(footer);
            text.push('\n');
        }
        text
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    data: &'a Value,
    warnings: &'a [String],
}

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let report = JsonReport {
                data: &result.data,
                warnings: &result.warnings,
            };
            let payload = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => render_table(result),
    }

    Ok(())
}

fn render_table(result: &CommandResult) {
    for (index, table) in result.tables.iter().enumerate() {
        if index > 0 {
            println!();
        }
        print!("{}", table.to_text());
    }

    if !result.warnings.is_empty() {
        println!();
        println!("warnings:");
        for warning in &result.warnings {
            println!("  - {warning}");
        }
    }
}
