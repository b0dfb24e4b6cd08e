//! CSV export of screening rows.
//!
//! Columns are `Ticker,DPO,DIO,DSO,CCC,Period,FiscalDateEnding`; undefined
//! metrics and unknown dates are written as empty cells.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::ExportError;
use crate::screener::TickerMetrics;
use crate::format_report_date;

/// File name used by `screen` when no output path is given.
pub const DEFAULT_EXPORT_FILE: &str = "DPO_DIO_DSO_CCC_Analysis.csv";

pub const CSV_HEADER: [&str; 7] = ["Ticker", "DPO", "DIO", "DSO", "CCC", "Period", "FiscalDateEnding"];

#[derive(Serialize)]
struct CsvRow<'a> {
    ticker: &'a str,
    dpo: Option<f64>,
    dio: Option<f64>,
    dso: Option<f64>,
    ccc: Option<f64>,
    period: &'static str,
    fiscal_date_ending: Option<String>,
}

impl<'a> From<&'a TickerMetrics> for CsvRow<'a> {
    fn from(row: &'a TickerMetrics) -> Self {
        Self {
            ticker: row.symbol.as_str(),
            dpo: row.metrics.dpo,
            dio: row.metrics.dio,
            dso: row.metrics.dso,
            ccc: row.metrics.ccc,
            period: row.period.as_str(),
            fiscal_date_ending: row.fiscal_date_ending.map(format_report_date),
        }
    }
}

/// Writes the header and one record per row. The header is written even
/// when `rows` is empty.
pub fn write_csv<W: Write>(rows: &[TickerMetrics], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADER)?;
    for row in rows {
        csv_writer.serialize(CsvRow::from(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Renders rows to an in-memory CSV string.
pub fn to_csv_string(rows: &[TickerMetrics]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(rows, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| ExportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Creates (or truncates) `path` and writes the rows to it.
pub fn export_csv(rows: &[TickerMetrics], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_csv(rows, io::BufWriter::new(file))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote csv export");
    Ok(())
}
