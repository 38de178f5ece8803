//! Ranking of screened securities.
//!
//! Orders a screened universe by quality tier, breaking ties with the
//! value-to-price ratio: the most conservative (lowest positive) model
//! value over the current price. A ratio above 1 means even the most
//! pessimistic computed model sees the security trading below value.

use hobart_data::StockRecord;
use hobart_valuation::QualityTier;
use serde::{Deserialize, Serialize};

/// One ranked security.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedStock {
    /// Ticker symbol.
    pub symbol: String,
    /// Exchange short code.
    pub exchange: String,
    /// Company name, if known.
    pub title: Option<String>,
    /// Quality tier.
    pub quality: QualityTier,
    /// Current market price.
    pub current_price: f64,
    /// Lowest positive model value, if any model computed one.
    pub lowest_model_value: Option<f64>,
    /// `lowest_model_value / current_price`; `None` when no model
    /// computed a positive value or the price is non-positive.
    pub value_ratio: Option<f64>,
}

impl RankedStock {
    fn from_record(record: &StockRecord) -> Self {
        let lowest_model_value = [
            record.valuation.pe_value,
            record.valuation.dcf_value,
            record.valuation.roe_value,
        ]
        .into_iter()
        .flatten()
        .filter(|v| *v > 0.0)
        .fold(None, |lowest: Option<f64>, v| {
            Some(lowest.map_or(v, |l| l.min(v)))
        });

        let value_ratio = match lowest_model_value {
            Some(value) if record.snapshot.current_price > 0.0 => {
                Some(value / record.snapshot.current_price)
            }
            _ => None,
        };

        Self {
            symbol: record.symbol.clone(),
            exchange: record.exchange.clone(),
            title: record.snapshot.title.clone(),
            quality: record.valuation.quality,
            current_price: record.snapshot.current_price,
            lowest_model_value,
            value_ratio,
        }
    }
}

/// Rank records best first: by tier, then by value ratio descending.
///
/// Securities without a computable ratio sort after those with one
/// inside the same tier.
pub fn rank_records(records: &[StockRecord]) -> Vec<RankedStock> {
    let mut ranked: Vec<RankedStock> = records.iter().map(RankedStock::from_record).collect();

    ranked.sort_by(|a, b| {
        a.quality.cmp(&b.quality).then_with(|| {
            match (a.value_ratio, b.value_ratio) {
                (Some(ra), Some(rb)) => rb.total_cmp(&ra),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.symbol.cmp(&b.symbol),
            }
        })
    });

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hobart_valuation::{StockSnapshot, ValuationResult};

    fn record(
        symbol: &str,
        price: f64,
        quality: QualityTier,
        values: (Option<f64>, Option<f64>, Option<f64>),
    ) -> StockRecord {
        StockRecord::new(
            symbol,
            "nas",
            StockSnapshot {
                current_price: price,
                ..Default::default()
            },
            ValuationResult {
                pe_value: values.0,
                dcf_value: values.1,
                roe_value: values.2,
                quality,
                evaluated_at: Utc::now(),
            },
        )
    }

    #[test]
    fn test_ratio_uses_the_lowest_positive_model_value() {
        let records = [record(
            "AAPL",
            20.0,
            QualityTier::Great,
            (Some(60.0), Some(40.0), Some(80.0)),
        )];

        let ranked = rank_records(&records);
        assert_eq!(ranked[0].lowest_model_value, Some(40.0));
        assert_eq!(ranked[0].value_ratio, Some(2.0));
    }

    #[test]
    fn test_non_positive_values_are_ignored_for_the_ratio() {
        let records = [record(
            "NEG",
            10.0,
            QualityTier::Okay,
            (Some(-5.0), Some(0.0), Some(30.0)),
        )];

        let ranked = rank_records(&records);
        assert_eq!(ranked[0].lowest_model_value, Some(30.0));
        assert_eq!(ranked[0].value_ratio, Some(3.0));
    }

    #[test]
    fn test_tier_dominates_ratio() {
        let records = [
            record("OKBIG", 10.0, QualityTier::Okay, (Some(100.0), None, None)),
            record("GRT", 10.0, QualityTier::Great, (Some(20.0), None, None)),
        ];

        let ranked = rank_records(&records);
        assert_eq!(ranked[0].symbol, "GRT");
        assert_eq!(ranked[1].symbol, "OKBIG");
    }

    #[test]
    fn test_higher_ratio_wins_within_a_tier() {
        let records = [
            record("LOW", 10.0, QualityTier::Great, (Some(15.0), None, None)),
            record("HIGH", 10.0, QualityTier::Great, (Some(45.0), None, None)),
        ];

        let ranked = rank_records(&records);
        assert_eq!(ranked[0].symbol, "HIGH");
    }

    #[test]
    fn test_no_computable_ratio_sorts_last_within_tier() {
        let records = [
            record("NONE", 10.0, QualityTier::Okay, (None, None, None)),
            record("SOME", 10.0, QualityTier::Okay, (Some(12.0), None, None)),
        ];

        let ranked = rank_records(&records);
        assert_eq!(ranked[0].symbol, "SOME");
        assert_eq!(ranked[1].value_ratio, None);
    }
}
