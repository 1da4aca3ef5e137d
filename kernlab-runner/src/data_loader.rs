//! Price loading for the runner.
//!
//! Reads daily closes from a CSV file with a `date` and a `close` column.
//! Header lookup is case-insensitive and every other column (Open, High,
//! Volume, ...) is ignored, so exports from the usual market data tools load
//! unchanged. Dates are `YYYY-MM-DD`; a trailing time part is tolerated.
//!
//! The symbol is the file stem. The dataset hash is BLAKE3 over every
//! (date, close) pair and identifies the series in search seeds and reports.

use std::path::Path;

use chrono::NaiveDate;
use kernlab_core::PriceBar;
use thiserror::Error;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: no '{column}' column in header")]
    MissingColumn { path: String, column: &'static str },

    #[error("{path}, row {row}: cannot parse date '{value}'")]
    BadDate { path: String, row: usize, value: String },

    #[error("{path}, row {row}: cannot parse close '{value}'")]
    BadClose { path: String, row: usize, value: String },

    #[error("{path}, row {row}: close must be finite and > 0, got {value}")]
    InvalidClose { path: String, row: usize, value: f64 },

    #[error("{path}, row {row}: date {date} is not after the previous row")]
    NonIncreasingDate {
        path: String,
        row: usize,
        date: NaiveDate,
    },
}

/// A loaded close series with provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    /// BLAKE3 hex over all (date, close) pairs.
    pub dataset_hash: String,
}

impl LoadedSeries {
    /// Build a series from bars already in memory.
    pub fn from_bars(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        let dataset_hash = dataset_hash(&bars);
        Self {
            symbol: symbol.into(),
            bars,
            dataset_hash,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Load a close series from a CSV file.
pub fn load_price_csv(path: &Path) -> Result<LoadedSeries, LoadError> {
    let path_str = path.display().to_string();
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path_str.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| LoadError::MissingColumn {
                path: path_str.clone(),
                column: name,
            })
    };
    let date_col = column("date")?;
    let close_col = column("close")?;

    let mut bars: Vec<PriceBar> = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        // Header is row 1
        let row = i + 2;

        let raw_date = record.get(date_col).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| LoadError::BadDate {
            path: path_str.clone(),
            row,
            value: raw_date.to_string(),
        })?;

        let raw_close = record.get(close_col).unwrap_or("");
        let close: f64 = raw_close.parse().map_err(|_| LoadError::BadClose {
            path: path_str.clone(),
            row,
            value: raw_close.to_string(),
        })?;

        let bar = PriceBar::new(date, close);
        if !bar.is_tradable() {
            return Err(LoadError::InvalidClose {
                path: path_str.clone(),
                row,
                value: close,
            });
        }
        if let Some(prev) = bars.last() {
            if date <= prev.timestamp {
                return Err(LoadError::NonIncreasingDate {
                    path: path_str.clone(),
                    row,
                    date,
                });
            }
        }
        bars.push(bar);
    }

    let symbol = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_str.clone());

    tracing::debug!(symbol = %symbol, bars = bars.len(), "loaded price series");
    Ok(LoadedSeries::from_bars(symbol, bars))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

/// Compute a BLAKE3 hash over every bar's date and close bits.
pub fn dataset_hash(bars: &[PriceBar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.timestamp.to_string().as_bytes());
        hasher.update(&bar.close.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
