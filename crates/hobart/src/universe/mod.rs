//! Universe management for the Hobart screener.
//!
//! A universe is whatever set of symbols a screen runs over; the common
//! case is a [`Watchlist`] loaded from per-exchange symbol files with
//! previously removed symbols filtered out.

pub mod exchange;
pub mod watchlist;

pub use exchange::Exchange;
pub use watchlist::{WatchEntry, Watchlist};

/// Trait for stock universes.
pub trait Universe {
    /// Get all symbols in the universe.
    fn symbols(&self) -> Vec<String>;

    /// Check if a symbol is in the universe.
    fn contains(&self, symbol: &str) -> bool {
        self.symbols().contains(&symbol.to_string())
    }

    /// Get the number of constituents.
    fn size(&self) -> usize {
        self.symbols().len()
    }
}

impl Universe for Watchlist {
    fn symbols(&self) -> Vec<String> {
        self.symbols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_trait() {
        let watchlist = Watchlist::new(vec![
            WatchEntry::new("AAPL", Exchange::Nasdaq),
            WatchEntry::new("SHOP", Exchange::Tsx),
        ]);

        assert!(watchlist.contains("AAPL"));
        assert!(!watchlist.contains("NOTREAL"));
        assert_eq!(watchlist.size(), 2);
    }
}
