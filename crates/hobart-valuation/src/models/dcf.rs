//! Discounted cash flow model.
//!
//! Projects ten years of free cash flow under a decaying growth rate,
//! discounts each year, adds a terminal multiple on the final discounted
//! flow, and nets cash against liabilities at the share level.

use super::round_cents;
use crate::numeric;
use serde::{Deserialize, Serialize};

/// Configuration for the DCF model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfConfig {
    /// Annual discount rate (default: 0.09).
    pub discount_rate: f64,
    /// Haircut applied to the growth estimate before projecting
    /// (default: 0.25).
    pub margin_of_safety: f64,
    /// Annual decay applied to the growth rate itself (default: 0.05).
    pub growth_decline: f64,
    /// Exit multiple on the final discounted flow (default: 12).
    pub terminal_multiple: f64,
    /// Projection horizon in years (default: 10).
    pub projection_years: u32,
}

impl Default for DcfConfig {
    fn default() -> Self {
        Self {
            discount_rate: 0.09,
            margin_of_safety: 0.25,
            growth_decline: 0.05,
            terminal_multiple: 12.0,
            projection_years: 10,
        }
    }
}

/// Snapshot fields the DCF model consumes.
#[derive(Debug, Clone, Default)]
pub struct DcfInputs {
    /// Cash and cash equivalents.
    pub cash_and_equivalents: Option<f64>,
    /// Total liabilities.
    pub total_liabilities: Option<f64>,
    /// Trailing free cash flow, signed.
    pub free_cash_flow: Option<f64>,
    /// Shares outstanding.
    pub shares_outstanding: Option<f64>,
    /// Normalized growth estimate.
    pub growth_estimate: f64,
}

/// Projects and discounts free cash flow plus a terminal multiple.
#[derive(Debug, Default)]
pub struct DcfModel {
    config: DcfConfig,
}

impl DcfModel {
    /// Create a model with the given configuration.
    pub const fn with_config(config: DcfConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub const fn config(&self) -> &DcfConfig {
        &self.config
    }

    /// Per-share intrinsic value, or `None` when any required field is
    /// unusable or the share count is zero.
    pub fn value(&self, inputs: &DcfInputs) -> Option<f64> {
        let cash = numeric::usable(inputs.cash_and_equivalents)?;
        let liabilities = numeric::usable(inputs.total_liabilities)?;
        let fcf = numeric::usable(inputs.free_cash_flow)?;
        let shares = numeric::usable(inputs.shares_outstanding)?;
        if shares == 0.0 {
            return None;
        }

        let growth = inputs.growth_estimate * (1.0 - self.config.margin_of_safety);
        let discount = 1.0 + self.config.discount_rate;

        // Year 1 grows at the full conservative rate; from year 2 on the
        // growth rate itself decays by `growth_decline` per year.
        let mut cash_flow = fcf * (1.0 + growth);
        let mut discounted = cash_flow / discount;
        let mut total_npv = discounted;

        for year in 2..=self.config.projection_years as i32 {
            let decayed_growth = growth * (1.0 - self.config.growth_decline).powi(year - 1);
            cash_flow *= 1.0 + decayed_growth;
            discounted = cash_flow / discount.powi(year);
            total_npv += discounted;
        }

        // Terminal value is a multiple of the already-discounted final
        // flow; it is not discounted a second time.
        let terminal = discounted * self.config.terminal_multiple;
        let value = (total_npv + terminal + cash - liabilities) / shares;

        Some(round_cents(value))
    }
}
