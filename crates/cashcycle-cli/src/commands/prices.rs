use cashcycle_core::{EnvelopeError, FundamentalsSource, Symbol};

use crate::cli::PricesArgs;
use crate::error::CliError;

use super::{CommandData, CommandResult};

pub async fn run<S: FundamentalsSource>(
    args: &PricesArgs,
    source: &S,
) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    if args.limit == 0 {
        return Err(CliError::Command(String::from(
            "--limit must be greater than zero",
        )));
    }

    let series = match source.daily_prices(&symbol, args.limit).await {
        Ok(series) => series,
        Err(error) => {
            tracing::warn!(%symbol, "{error}");
            return Ok(
                CommandResult::ok(CommandData::Prices { series: None }, source.id())
                    .with_errors(vec![EnvelopeError::from_source_error(&symbol, &error)]),
            );
        }
    };

    let available = series.len();
    let result = CommandResult::ok(
        CommandData::Prices {
            series: Some(series),
        },
        source.id(),
    );
    if available < args.limit {
        return Ok(result.with_warning(format!(
            "only {available} of {} requested trading days available",
            args.limit
        )));
    }
    Ok(result)
}
