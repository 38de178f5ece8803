//! Watchlist loading from per-exchange symbol files.

use crate::universe::Exchange;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

/// One watchlist entry: a symbol and where it is listed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchEntry {
    /// Ticker symbol as listed on its exchange.
    pub symbol: String,
    /// Listing exchange.
    pub exchange: Exchange,
}

impl WatchEntry {
    /// Create a new entry.
    pub fn new(symbol: impl Into<String>, exchange: Exchange) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
        }
    }
}

/// The set of symbols a screen runs over.
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    entries: Vec<WatchEntry>,
}

impl Watchlist {
    /// Watchlist over explicit entries.
    pub fn new(entries: Vec<WatchEntry>) -> Self {
        Self { entries }
    }

    /// Load symbol files from a directory.
    ///
    /// Each exchange reads `<code>.txt` (one symbol per line, blanks
    /// ignored). A missing file is logged and skipped so a partial
    /// directory still yields a usable watchlist; duplicates within and
    /// across files are dropped.
    pub fn load_dir(dir: &Path, exchanges: &[Exchange]) -> io::Result<Self> {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for &exchange in exchanges {
            let path = dir.join(format!("{}.txt", exchange.code()));
            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    warn!(path = %path.display(), "symbol file not found, skipping");
                    continue;
                }
                Err(err) => return Err(err),
            };

            for line in contents.lines() {
                let symbol = line.trim();
                if symbol.is_empty() {
                    continue;
                }
                let entry = WatchEntry::new(symbol.to_uppercase(), exchange);
                if seen.insert(entry.clone()) {
                    entries.push(entry);
                }
            }
        }

        Ok(Self { entries })
    }

    /// All entries, in file order.
    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    /// All symbols.
    pub fn symbols(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.symbol.clone()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the watchlist is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop symbols that were previously removed from screening.
    pub fn without_removed(mut self, removed: &HashSet<String>) -> Self {
        self.entries.retain(|e| !removed.contains(&e.symbol));
        self
    }

    /// A random subset of `n` entries; `0` means the whole list.
    ///
    /// Partial screens are mainly useful for smoke-testing a large
    /// universe without paying for a full pass.
    pub fn sample(&self, n: usize, rng: &mut impl rand::Rng) -> Vec<WatchEntry> {
        if n == 0 || n >= self.entries.len() {
            return self.entries.clone();
        }
        self.entries
            .choose_multiple(rng, n)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn watchlist() -> Watchlist {
        Watchlist::new(vec![
            WatchEntry::new("AAPL", Exchange::Nasdaq),
            WatchEntry::new("MSFT", Exchange::Nasdaq),
            WatchEntry::new("JPM", Exchange::Nyse),
            WatchEntry::new("SHOP", Exchange::Tsx),
        ])
    }

    #[test]
    fn test_load_dir_reads_per_exchange_files() {
        let dir = std::env::temp_dir().join("hobart-watchlist-test");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("nas.txt"), "aapl\n\nmsft\naapl\n").unwrap();
        fs::write(dir.join("tsx.txt"), "shop\n").unwrap();

        let watchlist = Watchlist::load_dir(
            &dir,
            &[Exchange::Nasdaq, Exchange::Tsx, Exchange::Nyse],
        )
        .unwrap();

        // Duplicate AAPL dropped, missing nyse.txt skipped.
        assert_eq!(watchlist.len(), 3);
        assert_eq!(
            watchlist.symbols(),
            vec!["AAPL".to_string(), "MSFT".to_string(), "SHOP".to_string()]
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_without_removed_filters_symbols() {
        let removed: HashSet<String> = ["MSFT".to_string(), "SHOP".to_string()].into();
        let filtered = watchlist().without_removed(&removed);

        assert_eq!(
            filtered.symbols(),
            vec!["AAPL".to_string(), "JPM".to_string()]
        );
    }

    #[test]
    fn test_sample_zero_is_the_whole_list() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(watchlist().sample(0, &mut rng).len(), 4);
        assert_eq!(watchlist().sample(100, &mut rng).len(), 4);
    }

    #[test]
    fn test_sample_returns_distinct_entries() {
        let mut rng = StdRng::seed_from_u64(7);
        let sample = watchlist().sample(2, &mut rng);
        assert_eq!(sample.len(), 2);
        assert_ne!(sample[0], sample[1]);
    }
}
