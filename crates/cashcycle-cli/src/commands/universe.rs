use cashcycle_core::{HttpClient, TickerSource};

use crate::cli::UniverseArgs;
use crate::error::CliError;

use super::{ticker_source_label, CommandData, CommandResult};

pub async fn run(
    args: &UniverseArgs,
    tickers: &TickerSource,
    http_client: &dyn HttpClient,
) -> Result<CommandResult, CliError> {
    let symbols = tickers.resolve(http_client, args.limit).await?;

    Ok(CommandResult::ok(
        CommandData::Universe {
            count: symbols.len(),
            symbols,
        },
        ticker_source_label(tickers),
    ))
}
