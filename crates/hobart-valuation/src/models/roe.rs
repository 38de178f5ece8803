//! Return-on-equity model.
//!
//! Projects ten years of per-share equity growth and dividends, then
//! capitalizes year-ten earnings as a perpetuity and discounts everything
//! back to a present value.

use super::round_cents;
use crate::numeric;
use serde::{Deserialize, Serialize};

/// Configuration for the ROE model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoeConfig {
    /// Annual discount rate, also the perpetuity capitalization rate
    /// (default: 0.09).
    pub discount_rate: f64,
    /// Haircut applied to the growth estimate before projecting
    /// (default: 0.25).
    pub margin_of_safety: f64,
    /// Projection horizon in years (default: 10).
    pub projection_years: u32,
}

impl Default for RoeConfig {
    fn default() -> Self {
        Self {
            discount_rate: 0.09,
            margin_of_safety: 0.25,
            projection_years: 10,
        }
    }
}

/// Snapshot fields the ROE model consumes.
///
/// `return_on_equity` is a fraction, not percentage points; callers
/// holding the upstream percentage figure divide by 100 before building
/// these inputs. The conversion stays at the call boundary so the model
/// arithmetic never guesses at units.
#[derive(Debug, Clone, Default)]
pub struct RoeInputs {
    /// Total stockholders equity.
    pub stockholders_equity: Option<f64>,
    /// Historical return on equity as a fraction (0.12 = 12%).
    pub return_on_equity: Option<f64>,
    /// Shares outstanding.
    pub shares_outstanding: Option<f64>,
    /// Trailing annual dividend rate.
    pub trailing_dividend_rate: Option<f64>,
    /// Normalized growth estimate.
    pub growth_estimate: f64,
}

/// Projects equity growth and dividends, discounted to present value.
#[derive(Debug, Default)]
pub struct RoeModel {
    config: RoeConfig,
}

impl RoeModel {
    /// Create a model with the given configuration.
    pub const fn with_config(config: RoeConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub const fn config(&self) -> &RoeConfig {
        &self.config
    }

    /// Present per-share value, or `None` when any required field is
    /// unusable or the share count is zero.
    pub fn value(&self, inputs: &RoeInputs) -> Option<f64> {
        let equity = numeric::usable(inputs.stockholders_equity)?;
        let roe = numeric::usable(inputs.return_on_equity)?;
        let shares = numeric::usable(inputs.shares_outstanding)?;
        let dividend = numeric::usable(inputs.trailing_dividend_rate)?;
        if shares == 0.0 {
            return None;
        }

        let growth = inputs.growth_estimate * (1.0 - self.config.margin_of_safety);
        let discount = 1.0 + self.config.discount_rate;
        let years = self.config.projection_years as i32;

        let mut equity_per_share = equity * (1.0 + growth) / shares;
        let mut dividend_level = dividend * (1.0 + growth);
        let mut npv_dividends = dividend_level / discount;

        for year in 2..=years {
            equity_per_share *= 1.0 + growth;
            dividend_level *= 1.0 + growth;
            npv_dividends += dividend_level / discount.powi(year);
        }

        // Capitalize final-year earnings as a perpetuity at the discount
        // rate, then bring that lump back to today.
        let final_net_income = equity_per_share * roe;
        let required_value = final_net_income / self.config.discount_rate;
        let discounted_required = required_value / discount.powi(years);

        Some(round_cents(npv_dividends + discounted_required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn inputs() -> RoeInputs {
        RoeInputs {
            stockholders_equity: Some(200_000_000.0),
            return_on_equity: Some(0.12),
            shares_outstanding: Some(10_000_000.0),
            trailing_dividend_rate: Some(1.50),
            growth_estimate: 0.10,
        }
    }

    /// Mirrors the model arithmetic step by step.
    fn expected_value(config: &RoeConfig, inputs: &RoeInputs) -> f64 {
        let growth = inputs.growth_estimate * (1.0 - config.margin_of_safety);
        let discount = 1.0 + config.discount_rate;
        let years = config.projection_years as i32;

        let shares = inputs.shares_outstanding.unwrap();
        let mut equity = inputs.stockholders_equity.unwrap() * (1.0 + growth) / shares;
        let mut dividend = inputs.trailing_dividend_rate.unwrap() * (1.0 + growth);
        let mut npv_dividends = dividend / discount;
        for year in 2..=years {
            equity *= 1.0 + growth;
            dividend *= 1.0 + growth;
            npv_dividends += dividend / discount.powi(year);
        }
        let required = equity * inputs.return_on_equity.unwrap() / config.discount_rate;
        let raw = npv_dividends + required / discount.powi(years);
        (raw * 100.0).round() / 100.0
    }

    #[test]
    fn test_matches_reference_arithmetic() {
        let model = RoeModel::default();
        let inputs = inputs();
        let value = model.value(&inputs).unwrap();
        assert_relative_eq!(value, expected_value(model.config(), &inputs), epsilon = 1e-9);
        assert!(value > 0.0);
    }

    #[test]
    fn test_zero_shares_yields_none() {
        let model = RoeModel::default();
        let mut inputs = inputs();
        inputs.shares_outstanding = Some(0.0);
        assert_eq!(model.value(&inputs), None);
    }

    #[rstest]
    #[case::no_equity(RoeInputs { stockholders_equity: None, ..inputs() })]
    #[case::no_roe(RoeInputs { return_on_equity: None, ..inputs() })]
    #[case::no_shares(RoeInputs { shares_outstanding: None, ..inputs() })]
    #[case::no_dividend(RoeInputs { trailing_dividend_rate: None, ..inputs() })]
    #[case::nan_equity(RoeInputs { stockholders_equity: Some(f64::NAN), ..inputs() })]
    fn test_missing_required_field_yields_none(#[case] inputs: RoeInputs) {
        let model = RoeModel::default();
        assert_eq!(model.value(&inputs), None);
    }

    #[test]
    fn test_zero_dividend_is_pure_equity_capitalization() {
        let model = RoeModel::default();
        let mut inputs = inputs();
        inputs.trailing_dividend_rate = Some(0.0);

        let config = model.config();
        let growth = inputs.growth_estimate * (1.0 - config.margin_of_safety);
        let discount = 1.0 + config.discount_rate;
        let years = config.projection_years as i32;
        let equity_10 = inputs.stockholders_equity.unwrap() * (1.0 + growth).powi(years)
            / inputs.shares_outstanding.unwrap();
        let expected = equity_10 * inputs.return_on_equity.unwrap()
            / config.discount_rate
            / discount.powi(years);
        let expected = (expected * 100.0).round() / 100.0;

        assert_relative_eq!(model.value(&inputs).unwrap(), expected, epsilon = 1e-6);
    }
}
