//! P/E reversion model.
//!
//! Projects earnings power five years forward at the historical multiple
//! and discounts the result back to a present per-share value.

use super::round_cents;
use crate::numeric;
use serde::{Deserialize, Serialize};

/// Configuration for the P/E reversion model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeReversionConfig {
    /// Annual discount rate (default: 0.09).
    pub discount_rate: f64,
    /// Multiplier applied to the analyst growth estimate before
    /// projecting; 0.75 keeps three quarters of the estimate.
    pub growth_haircut: f64,
    /// Projection horizon in years (default: 5).
    pub projection_years: u32,
}

impl Default for PeReversionConfig {
    fn default() -> Self {
        Self {
            discount_rate: 0.09,
            growth_haircut: 0.75,
            projection_years: 5,
        }
    }
}

/// Projects price from trailing EPS and the historical P/E multiple.
#[derive(Debug, Default)]
pub struct PeReversionModel {
    config: PeReversionConfig,
}

impl PeReversionModel {
    /// Create a model with the given configuration.
    pub const fn with_config(config: PeReversionConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub const fn config(&self) -> &PeReversionConfig {
        &self.config
    }

    /// Present per-share value implied by earnings reverting to the
    /// historical multiple, or `None` when EPS or the multiple is
    /// unusable.
    ///
    /// `growth_estimate` arrives already normalized (see
    /// [`crate::growth::normalize_growth`]), so an absent analyst
    /// estimate degrades to a zero-growth projection instead of
    /// disabling the model.
    pub fn value(
        &self,
        trailing_eps: Option<f64>,
        historical_pe: Option<f64>,
        growth_estimate: f64,
    ) -> Option<f64> {
        let eps = numeric::usable(trailing_eps)?;
        let pe = numeric::usable(historical_pe)?;

        let years = self.config.projection_years as i32;
        let growth_safety = growth_estimate * self.config.growth_haircut;
        let future_price = eps * pe * (1.0 + growth_safety).powi(years);
        let value = future_price / (1.0 + self.config.discount_rate).powi(years);

        Some(round_cents(value))
    }
}
