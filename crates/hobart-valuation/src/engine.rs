//! The valuation engine: snapshot in, classified result out.

use crate::classifier::{QualityClassifier, QualityTier};
use crate::growth;
use crate::models::{
    DcfConfig, DcfInputs, DcfModel, PeReversionConfig, PeReversionModel, RoeConfig, RoeInputs,
    RoeModel,
};
use crate::snapshot::StockSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one evaluation.
///
/// A model value of `None` means "could not be computed from this
/// snapshot"; `Some(0.0)` is a legitimately zero valuation. The two are
/// only conflated at export boundaries that still speak the legacy
/// 0-sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    /// P/E reversion value, rounded to cents.
    pub pe_value: Option<f64>,
    /// Discounted cash flow value, rounded to cents.
    pub dcf_value: Option<f64>,
    /// Return-on-equity value, rounded to cents.
    pub roe_value: Option<f64>,
    /// Assigned quality tier.
    pub quality: QualityTier,
    /// When this evaluation was computed.
    pub evaluated_at: DateTime<Utc>,
}

/// Runs the three models over a snapshot and classifies the outcome.
///
/// Pure: the only inputs are the snapshot, the model configurations, and
/// the caller-supplied clock, so re-evaluating an identical snapshot at a
/// fixed `now` reproduces the result bit for bit.
#[derive(Debug, Default)]
pub struct ValuationEngine {
    pe: PeReversionModel,
    dcf: DcfModel,
    roe: RoeModel,
    classifier: QualityClassifier,
}

impl ValuationEngine {
    /// Engine with default model configurations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with explicit model configurations.
    pub const fn with_configs(pe: PeReversionConfig, dcf: DcfConfig, roe: RoeConfig) -> Self {
        Self {
            pe: PeReversionModel::with_config(pe),
            dcf: DcfModel::with_config(dcf),
            roe: RoeModel::with_config(roe),
            classifier: QualityClassifier::new(),
        }
    }

    /// Evaluate one snapshot.
    ///
    /// The growth estimate is normalized once and shared by all three
    /// models; each model independently decides whether its remaining
    /// inputs are usable. The upstream ROE figure arrives in percentage
    /// points and is converted to a fraction here, at the call boundary.
    pub fn evaluate(&self, snapshot: &StockSnapshot, now: DateTime<Utc>) -> ValuationResult {
        let growth_estimate = growth::normalize_growth(snapshot.growth_estimate);

        let pe_value = self
            .pe
            .value(snapshot.trailing_eps, snapshot.historical_pe, growth_estimate);

        let dcf_value = self.dcf.value(&DcfInputs {
            cash_and_equivalents: snapshot.cash_and_equivalents,
            total_liabilities: snapshot.total_liabilities,
            free_cash_flow: snapshot.free_cash_flow,
            shares_outstanding: snapshot.shares_outstanding,
            growth_estimate,
        });

        let roe_value = self.roe.value(&RoeInputs {
            stockholders_equity: snapshot.stockholders_equity,
            return_on_equity: snapshot.historical_roe_pct.map(|pct| pct / 100.0),
            shares_outstanding: snapshot.shares_outstanding,
            trailing_dividend_rate: snapshot.trailing_dividend_rate,
            growth_estimate,
        });

        let quality =
            self.classifier
                .classify(snapshot.current_price, pe_value, dcf_value, roe_value);

        ValuationResult {
            pe_value,
            dcf_value,
            roe_value,
            quality,
            evaluated_at: now,
        }
    }
}
