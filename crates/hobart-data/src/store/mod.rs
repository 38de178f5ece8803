//! Persistence of evaluated stock records.

pub mod sqlite;

pub use sqlite::{StoreStats, ValuationStore};

use hobart_valuation::{StockSnapshot, ValuationResult};
use serde::{Deserialize, Serialize};

/// One evaluated security: the snapshot it was computed from, the
/// valuation outcome, and the identifiers persistence keys on.
///
/// The descriptive snapshot fields ride along unchanged; the store keeps
/// exactly one record per (symbol, exchange) and each evaluation replaces
/// the previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    /// Ticker symbol as listed on its exchange.
    pub symbol: String,
    /// Exchange short code (e.g. "nas", "nyse", "tsx").
    pub exchange: String,
    /// The fundamentals the valuation was computed from.
    pub snapshot: StockSnapshot,
    /// The valuation outcome.
    pub valuation: ValuationResult,
}

impl StockRecord {
    /// Create a record from an evaluation.
    pub fn new(
        symbol: impl Into<String>,
        exchange: impl Into<String>,
        snapshot: StockSnapshot,
        valuation: ValuationResult,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: exchange.into(),
            snapshot,
            valuation,
        }
    }
}
