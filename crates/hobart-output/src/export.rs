//! Export of screening results.
//!
//! Provides CSV and JSON export of stored stock records as flat rows.

use chrono::{DateTime, Utc};
use hobart_data::StockRecord;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// One flat export row for a screened security.
///
/// Absent model values are written as `0` — the legacy spreadsheet
/// convention for "not computable" — so downstream sheets keep numeric
/// columns. Inside the workspace the distinction is preserved as
/// `Option`; it is surrendered only here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValuationExport {
    /// Ticker symbol.
    pub symbol: String,
    /// Exchange short code.
    pub exchange: String,
    /// Company name.
    pub title: String,
    /// Quality tier label.
    pub quality: String,
    /// Current market price.
    pub current_price: f64,
    /// P/E reversion value (0 when not computable).
    pub pe_value: f64,
    /// DCF value (0 when not computable).
    pub dcf_value: f64,
    /// ROE value (0 when not computable).
    pub roe_value: f64,
    /// Market capitalization, if known.
    pub market_cap: Option<f64>,
    /// Industry classification.
    pub industry: Option<String>,
    /// When the evaluation ran.
    pub evaluated_at: DateTime<Utc>,
}

impl ValuationExport {
    /// Flatten a stored record into an export row.
    pub fn from_record(record: &StockRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            exchange: record.exchange.clone(),
            title: record.snapshot.title.clone().unwrap_or_default(),
            quality: record.valuation.quality.label().to_string(),
            current_price: record.snapshot.current_price,
            pe_value: record.valuation.pe_value.unwrap_or(0.0),
            dcf_value: record.valuation.dcf_value.unwrap_or(0.0),
            roe_value: record.valuation.roe_value.unwrap_or(0.0),
            market_cap: record.snapshot.market_cap,
            industry: record.snapshot.industry.clone(),
            evaluated_at: record.valuation.evaluated_at,
        }
    }
}

/// Serialize export rows in the requested format.
pub fn to_string(rows: &[ValuationExport], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for row in rows {
                writer.serialize(row)?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| ExportError::Io(std::io::Error::other(e)))?;
            String::from_utf8(bytes).map_err(|e| ExportError::Io(std::io::Error::other(e)))
        }
        ExportFormat::Json => Ok(serde_json::to_string(rows)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(rows)?),
    }
}

/// Write export rows to a file in the requested format.
pub fn write_file(
    rows: &[ValuationExport],
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    let contents = to_string(rows, format)?;
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hobart_valuation::{QualityTier, StockSnapshot, ValuationResult};

    fn record() -> StockRecord {
        StockRecord::new(
            "AAPL",
            "nas",
            StockSnapshot {
                current_price: 30.0,
                title: Some("Apple Inc.".to_string()),
                industry: Some("Consumer Electronics".to_string()),
                market_cap: Some(3.0e12),
                ..Default::default()
            },
            ValuationResult {
                pe_value: Some(69.98),
                dcf_value: None,
                roe_value: Some(41.25),
                quality: QualityTier::Okay,
                evaluated_at: Utc::now(),
            },
        )
    }

    #[test]
    fn test_absent_model_values_export_as_zero() {
        let row = ValuationExport::from_record(&record());
        assert_eq!(row.pe_value, 69.98);
        assert_eq!(row.dcf_value, 0.0);
        assert_eq!(row.roe_value, 41.25);
        assert_eq!(row.quality, "Okay");
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let rows = vec![ValuationExport::from_record(&record())];
        let csv = to_string(&rows, ExportFormat::Csv).unwrap();

        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("symbol,exchange,title,quality"));
        assert!(lines.next().unwrap().starts_with("AAPL,nas,Apple Inc.,Okay"));
    }

    #[test]
    fn test_json_round_trip() {
        let rows = vec![ValuationExport::from_record(&record())];
        let json = to_string(&rows, ExportFormat::PrettyJson).unwrap();

        let back: Vec<ValuationExport> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
