//! CSV export of a price series.
//!
//! Columns: Date, Open, High, Low, Close, Volume. Dates are ISO `YYYY-MM-DD`,
//! prices use the shortest exact decimal form.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::domain::PriceSeries;

pub const CSV_HEADER: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("export I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("nothing to export for {0}")]
    Empty(String),
}

/// Artifact name offered for download.
pub fn export_filename(ticker: &str) -> String {
    format!("{ticker}_history.csv")
}

/// Write `series` as CSV into any writer.
pub fn write_csv<W: Write>(series: &PriceSeries, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for bar in series.bars() {
        wtr.write_record([
            bar.date.format("%Y-%m-%d").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write `{ticker}_history.csv` into `dir` and return its path. Empty series are refused.
pub fn save_csv(series: &PriceSeries, dir: &Path) -> Result<PathBuf, ExportError> {
    if series.is_empty() {
        return Err(ExportError::Empty(series.symbol().to_string()));
    }
    let path = dir.join(export_filename(series.symbol()));
    let file = std::fs::File::create(&path).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    write_csv(series, std::io::BufWriter::new(file))?;
    info!(path = %path.display(), bars = series.len(), "exported price history");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_series;

    fn csv_text(series: &PriceSeries) -> String {
        let mut buf = Vec::new();
        write_csv(series, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn filename_uses_ticker() {
        assert_eq!(export_filename("TSLA"), "TSLA_history.csv");
    }

    #[test]
    fn header_and_rows() {
        let csv = csv_text(&make_series(&[100.0, 101.5]));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Open,High,Low,Close,Volume");
        assert_eq!(lines[1], "2024-01-02,100,101,99,100,1000");
        assert_eq!(lines[2], "2024-01-03,100,102.5,99,101.5,1000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_series_has_header_only() {
        let csv = csv_text(&PriceSeries::empty("X"));
        assert_eq!(csv, "Date,Open,High,Low,Close,Volume\n");
    }

    #[test]
    fn save_refuses_empty_series() {
        let dir = std::env::temp_dir();
        assert!(matches!(
            save_csv(&PriceSeries::empty("X"), &dir),
            Err(ExportError::Empty(_))
        ));
    }
}
