//! Quality classification of model outputs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete quality tier, best to worst.
///
/// Ordinals ascend as confidence in undervaluation decreases, so sorting
/// a universe by ordinal ascending ranks it by desirability descending.
/// `Good` sits between the classifier's top tier and `Okay`: the
/// classifier never emits it, but it remains part of the persisted scale
/// and is the usual screening threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    /// All three models agree the security trades below value.
    Great = 1,
    /// Screening threshold tier; assigned by curation, not the classifier.
    Good = 2,
    /// Two of three models suggest undervaluation.
    Okay = 3,
    /// Insufficient agreement or insufficient evidence.
    Bad = 4,
    /// Never evaluated.
    Unknown = 5,
}

impl QualityTier {
    /// Numeric ordinal used for persistence and sorting.
    pub const fn ordinal(self) -> i64 {
        self as i64
    }

    /// Parse a persisted ordinal.
    pub const fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            1 => Some(Self::Great),
            2 => Some(Self::Good),
            3 => Some(Self::Okay),
            4 => Some(Self::Bad),
            5 => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Whether this tier is at least as desirable as `threshold`.
    pub fn is_at_least(self, threshold: Self) -> bool {
        self <= threshold
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Great => "Great",
            Self::Good => "Good",
            Self::Okay => "Okay",
            Self::Bad => "Bad",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "great" => Ok(Self::Great),
            "good" => Ok(Self::Good),
            "okay" => Ok(Self::Okay),
            "bad" => Ok(Self::Bad),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("unknown quality tier: {s}")),
        }
    }
}

/// Number of missing model outputs at which classification is vetoed.
const MISSING_VETO_THRESHOLD: usize = 2;

/// Compares the current price against the three model outputs and
/// assigns a tier.
#[derive(Debug, Default, Clone, Copy)]
pub struct QualityClassifier;

impl QualityClassifier {
    /// Create a classifier.
    pub const fn new() -> Self {
        Self
    }

    /// Assign a tier from the three model outputs.
    ///
    /// The degenerate-input veto runs before any price comparison: with
    /// two or more models unable to compute, a single surviving signal
    /// is not evidence of undervaluation and the tier is forced to
    /// [`QualityTier::Bad`].
    pub fn classify(
        &self,
        current_price: f64,
        pe_value: Option<f64>,
        dcf_value: Option<f64>,
        roe_value: Option<f64>,
    ) -> QualityTier {
        let values = [pe_value, dcf_value, roe_value];

        let missing = values.iter().filter(|v| v.is_none()).count();
        if missing >= MISSING_VETO_THRESHOLD {
            return QualityTier::Bad;
        }

        let good_count = values
            .iter()
            .filter(|v| matches!(v, Some(value) if *value > current_price))
            .count();

        match good_count {
            3 => QualityTier::Great,
            2 => QualityTier::Okay,
            _ => QualityTier::Bad,
        }
    }
}
