//! Per-symbol report generation.

use chrono::{DateTime, Utc};
use hobart_data::StockRecord;
use hobart_valuation::QualityTier;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A report on one screened security.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Symbol being reported on.
    pub symbol: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Quality tier at generation time.
    pub quality: QualityTier,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report.
    pub fn new(symbol: String, quality: QualityTier, contents: serde_json::Value) -> Self {
        Self {
            symbol,
            timestamp: Utc::now(),
            quality,
            contents,
        }
    }

    /// Build a report straight from a stored record.
    pub fn from_record(record: &StockRecord) -> Self {
        let contents = json!({
            "title": record.snapshot.title,
            "industry": record.snapshot.industry,
            "current_price": record.snapshot.current_price,
            "models": {
                "pe_reversion": record.valuation.pe_value,
                "dcf": record.valuation.dcf_value,
                "roe": record.valuation.roe_value,
            },
            "market_cap": record.snapshot.market_cap,
            "revenue": record.snapshot.revenue,
            "net_income": record.snapshot.net_income,
            "esg_score": record.snapshot.esg_score,
            "news_count": record.snapshot.news.len(),
            "evaluated_at": record.valuation.evaluated_at,
        });

        Self::new(record.symbol.clone(), record.valuation.quality, contents)
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    symbol: Option<String>,
    quality: Option<QualityTier>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol.
    pub fn symbol(mut self, symbol: String) -> Self {
        self.symbol = Some(symbol);
        self
    }

    /// Set the quality tier.
    pub const fn quality(mut self, quality: QualityTier) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Set the report contents.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        Ok(Report::new(
            self.symbol.unwrap_or_default(),
            self.quality.unwrap_or(QualityTier::Unknown),
            self.contents.unwrap_or(serde_json::Value::Null),
        ))
    }
}
