use cashcycle_core::{
    export_csv, EnvelopeError, FundamentalsSource, HttpClient, Screener, SkipReason, TickerSource,
};

use crate::cli::ScreenArgs;
use crate::error::CliError;

use super::{CommandData, CommandResult, SkippedRow};

pub async fn run<S: FundamentalsSource>(
    args: &ScreenArgs,
    tickers: &TickerSource,
    screener: &Screener<S>,
    http_client: &dyn HttpClient,
) -> Result<CommandResult, CliError> {
    let symbols = tickers.resolve(http_client, args.limit).await?;
    tracing::info!(tickers = symbols.len(), "starting screen");

    let report = screener.run(&symbols).await;
    export_csv(&report.rows, &args.output)?;

    let errors = report
        .skipped
        .iter()
        .filter(|skipped| matches!(skipped.reason, SkipReason::FetchFailed(_)))
        .map(EnvelopeError::from_skipped)
        .collect::<Vec<_>>();

    let data = CommandData::Screen {
        skipped: report.skipped.iter().map(SkippedRow::from).collect(),
        rows: report.rows,
        output: args.output.clone(),
    };
    Ok(CommandResult::ok(data, screener.source().id()).with_errors(errors))
}
