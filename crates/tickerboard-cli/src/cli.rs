//! CLI argument definitions for tickerboard.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog` | List or search the index constituents |
//! | `summary` | Price overview and portfolio summary |
//! | `history` | Price history with moving averages |
//! | `export` | Write history extracts to CSV files |
//! | `daily` | Previous-day open/close spreadsheet for a ticker list |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `10000` | Request timeout in ms |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! tickerboard catalog --search apple
//! tickerboard summary AAPL MSFT NVDA
//! tickerboard history AAPL --start 2024-01-01 --end 2024-06-01 --format json --pretty
//! tickerboard export AAPL MSFT --out-dir exports
//! tickerboard daily --tickers tickers.json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub const DEFAULT_SYMBOLS: [&str; 3] = ["AAPL", "MSFT", "NVDA"];
pub const DEFAULT_START: &str = "2024-01-01";

/// Stock dashboard for S&P 500 constituents.
#[derive(Debug, Parser)]
#[command(
    name = "tickerboard",
    author,
    version,
    about = "Stock dashboard for S&P 500 constituents",
    long_about = "tickerboard loads the S&P 500 constituent list and summarizes price history, \
moving averages and portfolio changes for the symbols you pick.\n\
\n\
Use 'tickerboard <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Request timeout in milliseconds; overrides TICKERBOARD_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text tables.
    Table,
    /// Single JSON object.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the index constituents, optionally filtered.
    ///
    /// # Examples
    ///
    ///   tickerboard catalog
    ///   tickerboard catalog --search bank --limit 10
    Catalog(CatalogArgs),

    /// Current price, change and market cap per symbol, plus the portfolio average.
    ///
    /// # Examples
    ///
    ///   tickerboard summary
    ///   tickerboard summary AAPL MSFT --check-catalog
    Summary(SummaryArgs),

    /// Daily closes with day-over-day change and moving averages.
    ///
    /// # Examples
    ///
    ///   tickerboard history AAPL --start 2024-01-01
    ///   tickerboard history AAPL MSFT --window 20 --window 50
    History(HistoryArgs),

    /// Write full history, open/close and per-symbol close extracts as CSV.
    ///
    /// # Examples
    ///
    ///   tickerboard export AAPL MSFT --out-dir exports
    ///   tickerboard export --portfolio
    Export(ExportArgs),

    /// Open and close of the previous day for every ticker in a list file.
    ///
    /// # Examples
    ///
    ///   tickerboard daily
    ///   tickerboard daily --tickers my_tickers.json --date 2024-03-01
    Daily(DailyArgs),
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Case-insensitive filter over symbol and company name.
    #[arg(long)]
    pub search: Option<String>,

    /// Maximum number of records to print.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Symbol selection shared by the market data commands.
#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Symbols to fetch (default: AAPL MSFT NVDA).
    pub symbols: Vec<String>,

    /// Reject symbols missing from the constituent catalog.
    #[arg(long, default_value_t = false)]
    pub check_catalog: bool,
}

/// Date range shared by the history commands; the end date is exclusive.
#[derive(Debug, Args)]
pub struct RangeArgs {
    /// First day, YYYY-MM-DD.
    #[arg(long, default_value = DEFAULT_START)]
    pub start: String,

    /// Day after the last day, YYYY-MM-DD (default: today).
    #[arg(long)]
    pub end: Option<String>,

    /// Use prices as traded instead of split/dividend adjusted.
    #[arg(long, default_value_t = false)]
    pub raw: bool,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Moving-average window in trading days; repeatable (default: 20 and 30).
    #[arg(long = "window")]
    pub windows: Vec<usize>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Directory receiving the CSV files.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Also write the portfolio summary.
    #[arg(long, default_value_t = false)]
    pub portfolio: bool,
}

#[derive(Debug, Args)]
pub struct DailyArgs {
    /// JSON array of ticker symbols.
    #[arg(long, default_value = "tickers.json")]
    pub tickers: PathBuf,

    /// Trading day, YYYY-MM-DD (default: yesterday, UTC).
    #[arg(long)]
    pub date: Option<String>,

    /// Spreadsheet to write.
    #[arg(long, default_value = tickerboard_core::export::DAILY_XLSX_FILE)]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_defaults_to_starter_range_and_windows() {
        let cli = Cli::try_parse_from(["tickerboard", "history", "AAPL", "MSFT"]).expect("parses");
        let Command::History(args) = cli.command else {
            panic!("expected history command");
        };
        assert_eq!(args.selection.symbols, vec!["AAPL", "MSFT"]);
        assert!(!args.selection.check_catalog);
        assert_eq!(args.range.start, DEFAULT_START);
        assert!(args.range.end.is_none());
        assert!(args.windows.is_empty());
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "tickerboard",
            "daily",
            "--date",
            "2024-03-01",
            "--format",
            "json",
            "--timeout-ms",
            "2500",
        ])
        .expect("parses");
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.timeout_ms, Some(2500));
        let Command::Daily(args) = cli.command else {
            panic!("expected daily command");
        };
        assert_eq!(args.tickers, PathBuf::from("tickers.json"));
        assert_eq!(args.output, PathBuf::from("daily_open_close.xlsx"));
    }
}
