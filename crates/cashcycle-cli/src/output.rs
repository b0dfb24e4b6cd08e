use std::fmt::Write as _;

use cashcycle_core::{format_report_date, to_csv_string, Envelope, MetricResult, TickerMetrics};

use crate::cli::OutputFormat;
use crate::commands::CommandData;
use crate::error::CliError;

/// Placeholder for undefined metrics in human-readable output.
const UNDEFINED: &str = "N/A";

pub fn render(
    envelope: &Envelope<CommandData>,
    format: OutputFormat,
    pretty: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(if pretty {
            serde_json::to_string_pretty(envelope)?
        } else {
            serde_json::to_string(envelope)?
        }),
        OutputFormat::Table => Ok(render_table(envelope)),
        OutputFormat::Csv => render_csv(&envelope.data),
    }
}

fn render_table(envelope: &Envelope<CommandData>) -> String {
    let mut out = String::new();

    match &envelope.data {
        CommandData::Compute { metrics, .. } => {
            let _ = writeln!(out, "{:>10} {:>10} {:>10} {:>10}", "DPO", "DIO", "DSO", "CCC");
            let _ = writeln!(out, "{}", metric_cells(metrics));
        }
        CommandData::Metrics { rows } => write_metric_rows(&mut out, rows),
        CommandData::Screen {
            rows,
            skipped,
            output,
        } => {
            write_metric_rows(&mut out, rows);
            if !skipped.is_empty() {
                let _ = writeln!(out, "\nskipped ({}):", skipped.len());
                for skip in skipped {
                    let _ = writeln!(out, "  {:<8} {}", skip.symbol, skip.reason);
                }
            }
            let _ = writeln!(out, "\nwrote {} rows to {}", rows.len(), output.display());
        }
        CommandData::Prices { series } => match series {
            Some(series) => {
                let _ = writeln!(
                    out,
                    "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
                    "Date", "Open", "High", "Low", "Close", "Volume"
                );
                for price in &series.prices {
                    let _ = writeln!(
                        out,
                        "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12}",
                        format_report_date(price.date),
                        price.open,
                        price.high,
                        price.low,
                        price.close,
                        price
                            .volume
                            .map_or_else(|| String::from(UNDEFINED), |v| v.to_string())
                    );
                }
            }
            None => {
                let _ = writeln!(out, "no prices");
            }
        },
        CommandData::Universe { count, symbols } => {
            for symbol in symbols {
                let _ = writeln!(out, "{symbol}");
            }
            let _ = writeln!(out, "\n{count} tickers");
        }
    }

    if !envelope.meta.warnings.is_empty() {
        let _ = writeln!(out, "\nwarnings:");
        for warning in &envelope.meta.warnings {
            let _ = writeln!(out, "  - {warning}");
        }
    }
    if !envelope.errors.is_empty() {
        let _ = writeln!(out, "\nerrors:");
        for error in &envelope.errors {
            match &error.symbol {
                Some(symbol) => {
                    let _ = writeln!(out, "  - {symbol}: {}: {}", error.code, error.message);
                }
                None => {
                    let _ = writeln!(out, "  - {}: {}", error.code, error.message);
                }
            }
        }
    }

    out
}

fn write_metric_rows(out: &mut String, rows: &[TickerMetrics]) {
    let _ = writeln!(
        out,
        "{:<8} {:<10} {:<12} {:>10} {:>10} {:>10} {:>10}",
        "Ticker", "Period", "FiscalDate", "DPO", "DIO", "DSO", "CCC"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<8} {:<10} {:<12} {}",
            row.symbol,
            row.period,
            row.fiscal_date_ending
                .map_or_else(|| String::from(UNDEFINED), format_report_date),
            metric_cells(&row.metrics)
        );
    }
}

fn metric_cells(metrics: &MetricResult) -> String {
    [metrics.dpo, metrics.dio, metrics.dso, metrics.ccc]
        .into_iter()
        .map(|value| format!("{:>10}", format_metric(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Two decimals, or `N/A` when undefined.
pub fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| String::from(UNDEFINED), |v| format!("{v:.2}"))
}

fn render_csv(data: &CommandData) -> Result<String, CliError> {
    match data {
        CommandData::Metrics { rows } | CommandData::Screen { rows, .. } => {
            Ok(to_csv_string(rows)?)
        }
        CommandData::Compute { metrics, .. } => write_records(
            ["DPO", "DIO", "DSO", "CCC"],
            [[metrics.dpo, metrics.dio, metrics.dso, metrics.ccc]
                .map(|value| value.map(|v| v.to_string()).unwrap_or_default())],
        ),
        CommandData::Prices { series } => write_records(
            ["Date", "Open", "High", "Low", "Close", "Volume"],
            series.iter().flat_map(|series| &series.prices).map(|price| {
                [
                    format_report_date(price.date),
                    price.open.to_string(),
                    price.high.to_string(),
                    price.low.to_string(),
                    price.close.to_string(),
                    price.volume.map(|v| v.to_string()).unwrap_or_default(),
                ]
            }),
        ),
        CommandData::Universe { symbols, .. } => write_records(
            ["Symbol"],
            symbols.iter().map(|symbol| [symbol.to_string()]),
        ),
    }
}

fn write_records<const N: usize>(
    header: [&str; N],
    records: impl IntoIterator<Item = [String; N]>,
) -> Result<String, CliError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(header)
        .map_err(cashcycle_core::ExportError::from)?;
    for record in records {
        writer
            .write_record(&record)
            .map_err(cashcycle_core::ExportError::from)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CliError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| CliError::Command(format!("non-utf8 csv output: {e}")))
}
