use tickerboard_core::{format, MarketDataAggregator, PortfolioSummary};

use crate::cli::SummaryArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{resolve_symbols, CommandResult, Context};

pub async fn run(args: &SummaryArgs, context: &Context) -> Result<CommandResult, CliError> {
    let symbols = resolve_symbols(&args.selection, context).await?;
    let provider = context.provider();
    let summary = MarketDataAggregator::new(&provider)
        .portfolio(&symbols)
        .await?;

    let table = portfolio_table(&summary);
    let mut result = CommandResult::ok(serde_json::to_value(&summary)?).with_table(table);
    for row in summary.rows.iter().filter(|row| row.price.is_none()) {
        result = result.with_warning(format!("no current price for {}", row.ticker));
    }
    Ok(result)
}

fn portfolio_table(summary: &PortfolioSummary) -> Table {
    Table::new(
        "Portfolio summary",
        ["Ticker", "Price", "Previous Close", "Market Cap", "Change %"],
    )
    .with_rows(summary.rows.iter().map(|row| {
        vec![
            row.ticker.to_string(),
            format::price(row.price),
            format::price(row.previous_close),
            format::market_cap(row.market_cap),
            format::percent(row.change_percent),
        ]
    }))
    .with_footer(format!(
        "Average daily change: {}",
        format::percent(summary.average_change_percent)
    ))
}
