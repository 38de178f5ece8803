//! SQLite store for evaluated records, the watchlist, and removals.

use crate::error::{DataError, Result};
use crate::store::StockRecord;
use chrono::{DateTime, Utc};
use hobart_valuation::{NewsItem, QualityTier, StockSnapshot, ValuationResult};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

/// SQLite-backed store.
///
/// One row per (symbol, exchange); every evaluation replaces the prior
/// row. News items accumulate keyed by their feed identifier.
#[derive(Debug)]
pub struct ValuationStore {
    conn: Connection,
}

impl ValuationStore {
    /// Open (or create) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS stocks (
                symbol TEXT NOT NULL,
                exchange TEXT NOT NULL,

                current_price REAL NOT NULL,
                pe_value REAL,
                dcf_value REAL,
                roe_value REAL,
                quality INTEGER NOT NULL,

                title TEXT,
                industry TEXT,
                market_cap REAL,
                revenue REAL,
                net_income REAL,
                total_assets REAL,
                total_liabilities REAL,
                total_debt REAL,
                long_term_debt REAL,
                esg_score REAL,
                controversy REAL,
                summary TEXT,

                trailing_eps REAL,
                historical_pe REAL,
                growth_estimate REAL,
                free_cash_flow REAL,
                cash_and_equivalents REAL,
                shares_outstanding REAL,
                stockholders_equity REAL,
                historical_roe_pct REAL,
                trailing_dividend_rate REAL,

                failure_reason TEXT,
                evaluated_at TEXT NOT NULL,
                PRIMARY KEY (symbol, exchange)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_stocks_quality ON stocks(quality)",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS news (
                news_id TEXT PRIMARY KEY,
                symbol TEXT NOT NULL,
                exchange TEXT NOT NULL,
                title TEXT,
                summary TEXT,
                url TEXT,
                provider_name TEXT,
                published_at TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS watchlist (
                symbol TEXT NOT NULL,
                exchange TEXT NOT NULL,
                added_at TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (symbol, exchange)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS removed_symbols (
                symbol TEXT NOT NULL,
                exchange TEXT NOT NULL,
                reason TEXT NOT NULL,
                removed_at TEXT NOT NULL,
                PRIMARY KEY (symbol, exchange)
            )",
            [],
        )?;

        Ok(())
    }

    /// Store an evaluated record, replacing any prior row for the same
    /// symbol and exchange. News items are inserted keyed by feed id;
    /// duplicates are ignored.
    pub fn upsert_record(&self, record: &StockRecord) -> Result<()> {
        let snapshot = &record.snapshot;
        let valuation = &record.valuation;

        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT OR REPLACE INTO stocks (
                symbol, exchange,
                current_price, pe_value, dcf_value, roe_value, quality,
                title, industry, market_cap, revenue, net_income,
                total_assets, total_liabilities, total_debt, long_term_debt,
                esg_score, controversy, summary,
                trailing_eps, historical_pe, growth_estimate, free_cash_flow,
                cash_and_equivalents, shares_outstanding, stockholders_equity,
                historical_roe_pct, trailing_dividend_rate,
                failure_reason, evaluated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                      ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24,
                      ?25, ?26, ?27, ?28, NULL, ?29)",
            params![
                record.symbol,
                record.exchange,
                snapshot.current_price,
                valuation.pe_value,
                valuation.dcf_value,
                valuation.roe_value,
                valuation.quality.ordinal(),
                snapshot.title,
                snapshot.industry,
                snapshot.market_cap,
                snapshot.revenue,
                snapshot.net_income,
                snapshot.total_assets,
                snapshot.total_liabilities,
                snapshot.total_debt,
                snapshot.long_term_debt,
                snapshot.esg_score,
                snapshot.controversy,
                snapshot.summary,
                snapshot.trailing_eps,
                snapshot.historical_pe,
                snapshot.growth_estimate,
                snapshot.free_cash_flow,
                snapshot.cash_and_equivalents,
                snapshot.shares_outstanding,
                snapshot.stockholders_equity,
                snapshot.historical_roe_pct,
                snapshot.trailing_dividend_rate,
                valuation.evaluated_at.to_rfc3339(),
            ],
        )?;

        for item in &snapshot.news {
            tx.execute(
                "INSERT OR IGNORE INTO news (
                    news_id, symbol, exchange, title, summary, url,
                    provider_name, published_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    item.id,
                    record.symbol,
                    record.exchange,
                    item.title,
                    item.summary,
                    item.url,
                    item.provider_name,
                    item.published_at.map(|t| t.to_rfc3339()),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Record a symbol whose snapshot could not be obtained.
    ///
    /// The row keeps the failure reason and a Bad tier so the symbol
    /// still sorts to the bottom of screens without aborting the batch.
    pub fn record_failure(
        &self,
        symbol: &str,
        exchange: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO stocks (
                symbol, exchange, current_price, quality, failure_reason, evaluated_at
            ) VALUES (?1, ?2, 0.0, ?3, ?4, ?5)",
            params![
                symbol,
                exchange,
                QualityTier::Bad.ordinal(),
                reason,
                now.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Load a single record.
    pub fn get_record(&self, symbol: &str, exchange: &str) -> Result<Option<StockRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("{RECORD_SELECT} WHERE symbol = ?1 AND exchange = ?2"),
                params![symbol, exchange],
                record_from_row,
            )
            .optional()?;

        match record {
            Some(mut record) => {
                record.snapshot.news = self.news_for(symbol, exchange)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// When a symbol was last evaluated, if ever.
    pub fn last_evaluated(&self, symbol: &str, exchange: &str) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT evaluated_at FROM stocks WHERE symbol = ?1 AND exchange = ?2",
                params![symbol, exchange],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|s| parse_timestamp(&s)).transpose()
    }

    /// All records with a tier at least as desirable as `threshold`,
    /// ranked best first.
    pub fn records_at_least(&self, threshold: QualityTier) -> Result<Vec<StockRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT} WHERE quality <= ?1 ORDER BY quality ASC, symbol ASC"
        ))?;

        let rows = stmt.query_map(params![threshold.ordinal()], record_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Symbols with a tier at least as desirable as `threshold`.
    pub fn symbols_at_least(&self, threshold: QualityTier) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT symbol, exchange FROM stocks
             WHERE quality <= ?1 ORDER BY quality ASC, symbol ASC",
        )?;

        let rows = stmt.query_map(params![threshold.ordinal()], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row?);
        }
        Ok(symbols)
    }

    fn news_for(&self, symbol: &str, exchange: &str) -> Result<Vec<NewsItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT news_id, title, summary, url, provider_name, published_at
             FROM news WHERE symbol = ?1 AND exchange = ?2
             ORDER BY published_at DESC",
        )?;

        let rows = stmt.query_map(params![symbol, exchange], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (id, title, summary, url, provider_name, published_at) = row?;
            items.push(NewsItem {
                id,
                title,
                summary,
                url,
                provider_name,
                published_at: published_at.map(|s| parse_timestamp(&s)).transpose()?,
            });
        }
        Ok(items)
    }

    /// Add a symbol to the watchlist (idempotent, re-activates removed
    /// entries).
    pub fn watchlist_add(&self, symbol: &str, exchange: &str, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO watchlist (symbol, exchange, added_at, active)
             VALUES (?1, ?2, ?3, 1)",
            params![symbol, exchange, now.to_rfc3339()],
        )?;
        Ok(())
    }

    /// All active watchlist entries.
    pub fn watchlist_symbols(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT symbol, exchange FROM watchlist WHERE active = 1 ORDER BY symbol",
        )?;

        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row?);
        }
        Ok(symbols)
    }

    /// Mark a watchlist entry inactive.
    pub fn watchlist_remove(&self, symbol: &str, exchange: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE watchlist SET active = 0 WHERE symbol = ?1 AND exchange = ?2",
            params![symbol, exchange],
        )?;
        Ok(())
    }

    /// Record why a symbol was dropped from future screens.
    pub fn record_removal(
        &self,
        symbol: &str,
        exchange: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO removed_symbols (symbol, exchange, reason, removed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![symbol, exchange, reason, now.to_rfc3339()],
        )?;
        self.watchlist_remove(symbol, exchange)
    }

    /// Symbols excluded from screening.
    pub fn removed_symbols(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT symbol FROM removed_symbols ORDER BY symbol")?;

        let symbols = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(symbols)
    }

    /// Store statistics.
    pub fn stats(&self) -> Result<StoreStats> {
        let stocks: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM stocks", [], |row| row.get(0))?;
        let news_items: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM news", [], |row| row.get(0))?;
        let watchlist_size: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM watchlist WHERE active = 1",
            [],
            |row| row.get(0),
        )?;
        let removed: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM removed_symbols", [], |row| row.get(0))?;

        Ok(StoreStats {
            stocks: stocks as usize,
            news_items: news_items as usize,
            watchlist_size: watchlist_size as usize,
            removed: removed as usize,
        })
    }
}

/// Store statistics.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Number of evaluated stock rows.
    pub stocks: usize,
    /// Number of stored news items.
    pub news_items: usize,
    /// Active watchlist entries.
    pub watchlist_size: usize,
    /// Removed symbols.
    pub removed: usize,
}

const RECORD_SELECT: &str = "SELECT
    symbol, exchange,
    current_price, pe_value, dcf_value, roe_value, quality,
    title, industry, market_cap, revenue, net_income,
    total_assets, total_liabilities, total_debt, long_term_debt,
    esg_score, controversy, summary,
    trailing_eps, historical_pe, growth_estimate, free_cash_flow,
    cash_and_equivalents, shares_outstanding, stockholders_equity,
    historical_roe_pct, trailing_dividend_rate,
    evaluated_at
    FROM stocks";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<StockRecord> {
    let quality_ordinal: i64 = row.get(6)?;
    let quality = QualityTier::from_ordinal(quality_ordinal).unwrap_or(QualityTier::Unknown);

    let evaluated_at_raw: String = row.get(28)?;
    let evaluated_at = DateTime::parse_from_rfc3339(&evaluated_at_raw)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?
        .with_timezone(&Utc);

    let snapshot = StockSnapshot {
        current_price: row.get(2)?,
        trailing_eps: row.get(19)?,
        historical_pe: row.get(20)?,
        growth_estimate: row.get(21)?,
        free_cash_flow: row.get(22)?,
        cash_and_equivalents: row.get(23)?,
        total_liabilities: row.get(13)?,
        shares_outstanding: row.get(24)?,
        stockholders_equity: row.get(25)?,
        historical_roe_pct: row.get(26)?,
        trailing_dividend_rate: row.get(27)?,
        title: row.get(7)?,
        industry: row.get(8)?,
        market_cap: row.get(9)?,
        revenue: row.get(10)?,
        net_income: row.get(11)?,
        total_assets: row.get(12)?,
        total_debt: row.get(14)?,
        long_term_debt: row.get(15)?,
        esg_score: row.get(16)?,
        controversy: row.get(17)?,
        summary: row.get(18)?,
        news: Vec::new(),
        last_evaluated: Some(evaluated_at),
    };

    let valuation = ValuationResult {
        pe_value: row.get(3)?,
        dcf_value: row.get(4)?,
        roe_value: row.get(5)?,
        quality,
        evaluated_at,
    };

    Ok(StockRecord {
        symbol: row.get(0)?,
        exchange: row.get(1)?,
        snapshot,
        valuation,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DataError::TimeConversion(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 15, 0, 0).unwrap()
    }

    fn record(symbol: &str, quality: QualityTier) -> StockRecord {
        StockRecord::new(
            symbol,
            "nas",
            StockSnapshot {
                current_price: 30.0,
                trailing_eps: Some(5.0),
                historical_pe: Some(15.0),
                growth_estimate: Some(0.10),
                title: Some(format!("{symbol} Corp")),
                news: vec![NewsItem {
                    id: format!("{symbol}-news-1"),
                    title: Some("Headline".to_string()),
                    summary: None,
                    url: None,
                    provider_name: Some("Yahoo Finance".to_string()),
                    published_at: Some(now()),
                }],
                ..Default::default()
            },
            ValuationResult {
                pe_value: Some(69.98),
                dcf_value: None,
                roe_value: None,
                quality,
                evaluated_at: now(),
            },
        )
    }

    #[test]
    fn test_store_initialization() {
        assert!(ValuationStore::in_memory().is_ok());
    }

    #[test]
    fn test_record_round_trip() {
        let store = ValuationStore::in_memory().unwrap();
        store.upsert_record(&record("AAPL", QualityTier::Okay)).unwrap();

        let loaded = store.get_record("AAPL", "nas").unwrap().unwrap();
        assert_eq!(loaded.symbol, "AAPL");
        assert_eq!(loaded.valuation.pe_value, Some(69.98));
        assert_eq!(loaded.valuation.dcf_value, None);
        assert_eq!(loaded.valuation.quality, QualityTier::Okay);
        assert_eq!(loaded.snapshot.title.as_deref(), Some("AAPL Corp"));
        assert_eq!(loaded.snapshot.last_evaluated, Some(now()));
        assert_eq!(loaded.snapshot.news.len(), 1);
        assert_eq!(loaded.snapshot.news[0].id, "AAPL-news-1");
    }

    #[test]
    fn test_reevaluation_replaces_the_prior_row() {
        let store = ValuationStore::in_memory().unwrap();
        store.upsert_record(&record("AAPL", QualityTier::Okay)).unwrap();

        let mut updated = record("AAPL", QualityTier::Great);
        updated.valuation.pe_value = Some(75.12);
        store.upsert_record(&updated).unwrap();

        let loaded = store.get_record("AAPL", "nas").unwrap().unwrap();
        assert_eq!(loaded.valuation.quality, QualityTier::Great);
        assert_eq!(loaded.valuation.pe_value, Some(75.12));
        assert_eq!(store.stats().unwrap().stocks, 1);
    }

    #[test]
    fn test_last_evaluated() {
        let store = ValuationStore::in_memory().unwrap();
        assert_eq!(store.last_evaluated("AAPL", "nas").unwrap(), None);

        store.upsert_record(&record("AAPL", QualityTier::Okay)).unwrap();
        assert_eq!(store.last_evaluated("AAPL", "nas").unwrap(), Some(now()));
    }

    #[test]
    fn test_quality_threshold_queries() {
        let store = ValuationStore::in_memory().unwrap();
        store.upsert_record(&record("GRT", QualityTier::Great)).unwrap();
        store.upsert_record(&record("OK", QualityTier::Okay)).unwrap();
        store.upsert_record(&record("BAD", QualityTier::Bad)).unwrap();

        let good = store.symbols_at_least(QualityTier::Okay).unwrap();
        assert_eq!(
            good,
            vec![
                ("GRT".to_string(), "nas".to_string()),
                ("OK".to_string(), "nas".to_string())
            ]
        );

        let records = store.records_at_least(QualityTier::Okay).unwrap();
        assert_eq!(records.len(), 2);
        // Best tier first.
        assert_eq!(records[0].symbol, "GRT");
    }

    #[test]
    fn test_failure_rows_sort_to_the_bottom() {
        let store = ValuationStore::in_memory().unwrap();
        store
            .record_failure("DEAD", "nyse", "current price unavailable", now())
            .unwrap();

        let all = store.records_at_least(QualityTier::Unknown).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].valuation.quality, QualityTier::Bad);
        assert_eq!(all[0].valuation.pe_value, None);

        assert_eq!(store.last_evaluated("DEAD", "nyse").unwrap(), Some(now()));
    }

    #[test]
    fn test_watchlist_and_removals() {
        let store = ValuationStore::in_memory().unwrap();
        store.watchlist_add("AAPL", "nas", now()).unwrap();
        store.watchlist_add("SHOP", "tsx", now()).unwrap();
        assert_eq!(store.watchlist_symbols().unwrap().len(), 2);

        store
            .record_removal("SHOP", "tsx", "growth estimate not found", now())
            .unwrap();
        let remaining = store.watchlist_symbols().unwrap();
        assert_eq!(remaining, vec![("AAPL".to_string(), "nas".to_string())]);
        assert_eq!(store.removed_symbols().unwrap(), vec!["SHOP".to_string()]);

        let stats = store.stats().unwrap();
        assert_eq!(stats.watchlist_size, 1);
        assert_eq!(stats.removed, 1);
    }

    #[test]
    fn test_news_is_deduplicated_by_feed_id() {
        let store = ValuationStore::in_memory().unwrap();
        store.upsert_record(&record("AAPL", QualityTier::Okay)).unwrap();
        store.upsert_record(&record("AAPL", QualityTier::Okay)).unwrap();

        assert_eq!(store.stats().unwrap().news_items, 1);
    }
}
