//! The typed snapshot of fundamentals the valuation core consumes.
//!
//! Fetch collaborators assemble a [`StockSnapshot`] from whatever upstream
//! payloads they speak (quote-summary JSON, quote history, RSS feeds) and
//! hand it over fully typed. The core never sees raw nested maps; any field
//! the upstream could not supply as a finite number arrives as `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single news item attached to a snapshot.
///
/// Forwarded unchanged to persistence; the core never inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Stable feed identifier, used for de-duplication downstream.
    pub id: String,
    /// Headline.
    pub title: Option<String>,
    /// Short summary or excerpt.
    pub summary: Option<String>,
    /// Link to the article.
    pub url: Option<String>,
    /// Publishing outlet.
    pub provider_name: Option<String>,
    /// Publication timestamp.
    pub published_at: Option<DateTime<Utc>>,
}

/// Raw fundamentals for one security, immutable once constructed.
///
/// A fresh snapshot is produced on every evaluation attempt. Model inputs
/// are `Option<f64>` so that a missing or non-numeric upstream field
/// disables only the models that require it (the affected model yields no
/// value; evaluation continues).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// Current market price. The one field without which an evaluation
    /// cannot proceed at all.
    pub current_price: f64,

    // Model inputs
    /// Trailing twelve-month earnings per share.
    pub trailing_eps: Option<f64>,
    /// Five-year historical price-to-earnings multiple.
    pub historical_pe: Option<f64>,
    /// Analyst growth estimate as a fraction (0.08 = 8%).
    pub growth_estimate: Option<f64>,
    /// Trailing free cash flow, signed.
    pub free_cash_flow: Option<f64>,
    /// Cash and cash equivalents.
    pub cash_and_equivalents: Option<f64>,
    /// Total liabilities.
    pub total_liabilities: Option<f64>,
    /// Shares outstanding.
    pub shares_outstanding: Option<f64>,
    /// Total stockholders equity.
    pub stockholders_equity: Option<f64>,
    /// Historical return on equity in percentage points (12.0 = 12%).
    pub historical_roe_pct: Option<f64>,
    /// Trailing annual dividend rate.
    pub trailing_dividend_rate: Option<f64>,

    // Descriptive pass-through, forwarded to persistence unchanged
    /// Company long name.
    pub title: Option<String>,
    /// Industry classification.
    pub industry: Option<String>,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Total revenue.
    pub revenue: Option<f64>,
    /// Net income.
    pub net_income: Option<f64>,
    /// Total assets.
    pub total_assets: Option<f64>,
    /// Total debt.
    pub total_debt: Option<f64>,
    /// Long-term debt.
    pub long_term_debt: Option<f64>,
    /// Total ESG score.
    pub esg_score: Option<f64>,
    /// Highest ESG controversy level.
    pub controversy: Option<f64>,
    /// Long business summary.
    pub summary: Option<String>,
    /// Recent news items.
    pub news: Vec<NewsItem>,

    /// When this security was last evaluated, if ever.
    pub last_evaluated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_has_no_usable_inputs() {
        let snapshot = StockSnapshot::default();
        assert_eq!(snapshot.current_price, 0.0);
        assert!(snapshot.trailing_eps.is_none());
        assert!(snapshot.news.is_empty());
        assert!(snapshot.last_evaluated.is_none());
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let snapshot = StockSnapshot {
            current_price: 101.5,
            trailing_eps: Some(5.0),
            growth_estimate: Some(0.08),
            title: Some("Example Corp".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: StockSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.current_price, 101.5);
        assert_eq!(back.trailing_eps, Some(5.0));
        assert_eq!(back.title.as_deref(), Some("Example Corp"));
    }
}
