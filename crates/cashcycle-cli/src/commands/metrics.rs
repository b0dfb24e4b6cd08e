use cashcycle_core::{EnvelopeError, FundamentalsSource, Screener};

use crate::cli::MetricsArgs;
use crate::error::CliError;

use super::{parse_symbols, CommandData, CommandResult};

pub async fn run<S: FundamentalsSource>(
    args: &MetricsArgs,
    screener: &Screener<S>,
) -> Result<CommandResult, CliError> {
    let symbols = parse_symbols(&args.symbols)?;

    let mut rows = Vec::with_capacity(symbols.len());
    let mut errors = Vec::new();
    for symbol in &symbols {
        match screener.evaluate(symbol).await {
            Ok(row) => rows.push(row),
            Err(error) => {
                tracing::warn!(%symbol, "{error}");
                errors.push(EnvelopeError::from_source_error(symbol, &error));
            }
        }
    }

    Ok(CommandResult::ok(CommandData::Metrics { rows }, screener.source().id()).with_errors(errors))
}
