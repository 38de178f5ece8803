//! Snapshot assembly from Yahoo Finance quote-summary payloads.
//!
//! The loosely-typed upstream JSON never leaves this module: every field
//! is pulled through a typed adapter and the valuation core only ever
//! sees the finished [`StockSnapshot`].

use crate::error::{DataError, Result};
use crate::yahoo::news;
use chrono::{Duration as ChronoDuration, Utc};
use hobart_valuation::{StockSnapshot, numeric};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

/// Quote-summary endpoint; `{}` is the Yahoo-formatted symbol.
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary/{}";

/// Modules requested from the quote-summary endpoint.
const QUOTE_SUMMARY_MODULES: &str = "price,quoteType,summaryDetail,defaultKeyStatistics,\
     earningsTrend,assetProfile,summaryProfile,esgScores,financialData,balanceSheetHistory,\
     balanceSheetHistoryQuarterly,incomeStatementHistory,cashflowStatementHistoryQuarterly";

/// Years of quote history used to derive the historical P/E multiple.
const HISTORICAL_PE_YEARS: i64 = 5;

/// Yahoo Finance snapshot provider with rate limiting.
pub struct YahooSnapshotProvider {
    client: reqwest::Client,
    connector: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooSnapshotProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooSnapshotProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooSnapshotProvider {
    /// Provider with default rate limiting (1 req/sec).
    pub fn new() -> Self {
        Self::with_rate_limit(Duration::from_millis(1000))
    }

    /// Provider with custom rate limiting.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
                .build()
                .expect("Failed to create HTTP client"),
            connector: yahoo::YahooConnector::new().expect("Failed to create Yahoo connector"),
            rate_limit_delay,
        }
    }

    /// Fetch a full snapshot for one Yahoo-formatted symbol.
    ///
    /// A missing current price fails the whole snapshot: without it
    /// nothing downstream can be classified. Every other field degrades
    /// to `None` and only disables the models that need it. News is
    /// best-effort and never fails the fetch.
    pub async fn fetch_snapshot(&self, symbol: &str) -> Result<StockSnapshot> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        sleep(self.rate_limit_delay).await;

        let summary = self.fetch_quote_summary(symbol).await?;
        let mut snapshot = build_snapshot(symbol, &summary)?;

        snapshot.historical_pe = match self
            .fetch_historical_pe(symbol, snapshot.trailing_eps)
            .await
        {
            Ok(pe) => pe,
            Err(err) => {
                warn!(symbol, error = %err, "historical P/E unavailable");
                None
            }
        };

        snapshot.news = match news::fetch_news(&self.client, symbol).await {
            Ok(items) => items,
            Err(err) => {
                warn!(symbol, error = %err, "news feed unavailable");
                Vec::new()
            }
        };

        Ok(snapshot)
    }

    async fn fetch_quote_summary(&self, symbol: &str) -> Result<Value> {
        let url = QUOTE_SUMMARY_URL.replace("{}", symbol);
        let response = self
            .client
            .get(&url)
            .query(&[("modules", QUOTE_SUMMARY_MODULES)])
            .send()
            .await
            .map_err(DataError::Network)?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                symbol: symbol.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(DataError::YahooApi(format!(
                "quote summary for {}: HTTP {}",
                symbol,
                response.status()
            )));
        }

        let body: Value = response.json().await.map_err(DataError::Network)?;

        let container = &body["quoteSummary"];
        if let Some(error) = container.get("error").filter(|e| !e.is_null()) {
            return Err(DataError::YahooApi(format!(
                "quote summary for {}: {}",
                symbol, error
            )));
        }

        container
            .get("result")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .cloned()
            .ok_or_else(|| DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "empty quote summary result".to_string(),
            })
    }

    /// Derive a historical P/E multiple from five years of quote history
    /// over trailing EPS.
    async fn fetch_historical_pe(
        &self,
        symbol: &str,
        trailing_eps: Option<f64>,
    ) -> Result<Option<f64>> {
        let Some(eps) = numeric::usable(trailing_eps).filter(|eps| *eps > 0.0) else {
            debug!(symbol, "no positive trailing EPS, skipping historical P/E");
            return Ok(None);
        };

        let end = Utc::now();
        let start = end - ChronoDuration::days(HISTORICAL_PE_YEARS * 365);
        let start = time::OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;
        let end = time::OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;

        let response = self
            .connector
            .get_quote_history_interval(symbol, start, end, "3mo")
            .await?;
        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;
        if quotes.is_empty() {
            return Ok(None);
        }

        let average_close =
            quotes.iter().map(|q| q.adjclose).sum::<f64>() / quotes.len() as f64;
        Ok(Some(average_close / eps))
    }
}

impl Default for YahooSnapshotProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble the typed snapshot from a quote-summary result node.
///
/// Pure so that payload-to-snapshot mapping is testable offline.
fn build_snapshot(symbol: &str, summary: &Value) -> Result<StockSnapshot> {
    let current_price = numeric_at(summary, &["price", "regularMarketPrice"]).ok_or_else(|| {
        DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "current price unavailable".to_string(),
        }
    })?;

    Ok(StockSnapshot {
        current_price,

        trailing_eps: numeric_at(summary, &["defaultKeyStatistics", "trailingEps"]),
        // Filled in by the provider from quote history.
        historical_pe: None,
        growth_estimate: growth_estimate(summary),
        free_cash_flow: trailing_free_cash_flow(summary),
        cash_and_equivalents: annual_balance_field(summary, "cash"),
        total_liabilities: annual_balance_field(summary, "totalLiab"),
        shares_outstanding: numeric_at(summary, &["defaultKeyStatistics", "sharesOutstanding"]),
        stockholders_equity: annual_balance_field(summary, "totalStockholderEquity"),
        historical_roe_pct: numeric_at(summary, &["financialData", "returnOnEquity"])
            .map(|fraction| fraction * 100.0),
        trailing_dividend_rate: numeric_at(summary, &["summaryDetail", "trailingAnnualDividendRate"]),

        title: string_at(summary, &["quoteType", "longName"]),
        industry: string_at(summary, &["assetProfile", "industry"]),
        market_cap: numeric_at(summary, &["summaryDetail", "marketCap"]),
        revenue: income_statement_field(summary, "totalRevenue"),
        net_income: income_statement_field(summary, "netIncome"),
        total_assets: quarterly_balance_field(summary, "totalAssets"),
        total_debt: numeric_at(summary, &["financialData", "totalDebt"]),
        long_term_debt: quarterly_balance_field(summary, "longTermDebt"),
        esg_score: numeric_at(summary, &["esgScores", "totalEsg"]),
        controversy: numeric_at(summary, &["esgScores", "highestControversy"]),
        summary: string_at(summary, &["summaryProfile", "longBusinessSummary"]),
        news: Vec::new(),

        last_evaluated: None,
    })
}

/// Walk a path of object keys.
fn node_at<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.get(*key))
}

/// Numeric field at a path; unwraps Yahoo's `{"raw": ..., "fmt": ...}`
/// envelopes when present.
fn numeric_at(root: &Value, path: &[&str]) -> Option<f64> {
    let node = node_at(root, path)?;
    numeric::from_loose(node.get("raw").unwrap_or(node))
}

/// String field at a path.
fn string_at(root: &Value, path: &[&str]) -> Option<String> {
    node_at(root, path)?.as_str().map(str::to_string)
}

/// Latest annual balance-sheet figure.
fn annual_balance_field(summary: &Value, field: &str) -> Option<f64> {
    let statements =
        node_at(summary, &["balanceSheetHistory", "balanceSheetStatements"])?.as_array()?;
    numeric_at(statements.first()?, &[field])
}

/// Latest quarterly balance-sheet figure.
fn quarterly_balance_field(summary: &Value, field: &str) -> Option<f64> {
    let statements = node_at(
        summary,
        &["balanceSheetHistoryQuarterly", "balanceSheetStatements"],
    )?
    .as_array()?;
    numeric_at(statements.first()?, &[field])
}

/// Latest annual income-statement figure.
fn income_statement_field(summary: &Value, field: &str) -> Option<f64> {
    let statements =
        node_at(summary, &["incomeStatementHistory", "incomeStatementHistory"])?.as_array()?;
    numeric_at(statements.first()?, &[field])
}

/// Analyst growth estimate from the one-year-forward earnings trend.
fn growth_estimate(summary: &Value) -> Option<f64> {
    let trend = node_at(summary, &["earningsTrend", "trend"])?.as_array()?;
    let next_year = trend
        .iter()
        .find(|entry| entry.get("period").and_then(Value::as_str) == Some("+1y"))?;
    numeric_at(next_year, &["growth"])
}

/// Trailing free cash flow: operating cash flow plus (negative) capital
/// expenditures over the last four quarters.
fn trailing_free_cash_flow(summary: &Value) -> Option<f64> {
    let statements = node_at(
        summary,
        &["cashflowStatementHistoryQuarterly", "cashflowStatements"],
    )?
    .as_array()?;

    let mut total = 0.0;
    let mut any_operating = false;
    for statement in statements.iter().take(4) {
        if let Some(operating) = numeric_at(statement, &["totalCashFromOperatingActivities"]) {
            total += operating;
            any_operating = true;
        }
        if let Some(capex) = numeric_at(statement, &["capitalExpenditures"]) {
            total += capex;
        }
    }

    any_operating.then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn summary_payload() -> Value {
        json!({
            "price": { "regularMarketPrice": { "raw": 42.5, "fmt": "42.50" } },
            "quoteType": { "longName": "Example Corp" },
            "assetProfile": { "industry": "Semiconductors" },
            "summaryProfile": { "longBusinessSummary": "Makes examples." },
            "summaryDetail": {
                "marketCap": { "raw": 4.0e9 },
                "trailingAnnualDividendRate": { "raw": 1.12 }
            },
            "defaultKeyStatistics": {
                "trailingEps": { "raw": 4.1 },
                "sharesOutstanding": { "raw": 95_000_000.0 }
            },
            "financialData": {
                "returnOnEquity": { "raw": 0.145 },
                "totalDebt": { "raw": 9.0e8 }
            },
            "esgScores": { "totalEsg": { "raw": 21.3 }, "highestControversy": 2.0 },
            "earningsTrend": { "trend": [
                { "period": "0q", "growth": { "raw": 0.021 } },
                { "period": "+1y", "growth": { "raw": 0.07 } }
            ]},
            "balanceSheetHistory": { "balanceSheetStatements": [
                {
                    "cash": { "raw": 5.4e8 },
                    "totalLiab": { "raw": 1.25e9 },
                    "totalStockholderEquity": { "raw": 1.9e9 }
                }
            ]},
            "balanceSheetHistoryQuarterly": { "balanceSheetStatements": [
                { "totalAssets": { "raw": 3.3e9 }, "longTermDebt": { "raw": 6.0e8 } }
            ]},
            "incomeStatementHistory": { "incomeStatementHistory": [
                { "totalRevenue": { "raw": 2.1e9 }, "netIncome": { "raw": 2.6e8 } }
            ]},
            "cashflowStatementHistoryQuarterly": { "cashflowStatements": [
                { "totalCashFromOperatingActivities": { "raw": 1.0e8 },
                  "capitalExpenditures": { "raw": -2.0e7 } },
                { "totalCashFromOperatingActivities": { "raw": 9.0e7 },
                  "capitalExpenditures": { "raw": -1.5e7 } },
                { "totalCashFromOperatingActivities": { "raw": 8.0e7 },
                  "capitalExpenditures": { "raw": -1.0e7 } },
                { "totalCashFromOperatingActivities": { "raw": 7.0e7 },
                  "capitalExpenditures": { "raw": -5.0e6 } }
            ]}
        })
    }

    #[test]
    fn test_build_snapshot_extracts_typed_fields() {
        let snapshot = build_snapshot("EXMP", &summary_payload()).unwrap();

        assert_eq!(snapshot.current_price, 42.5);
        assert_eq!(snapshot.trailing_eps, Some(4.1));
        assert_eq!(snapshot.growth_estimate, Some(0.07));
        assert_eq!(snapshot.shares_outstanding, Some(95_000_000.0));
        assert_eq!(snapshot.cash_and_equivalents, Some(5.4e8));
        assert_eq!(snapshot.total_liabilities, Some(1.25e9));
        assert_eq!(snapshot.stockholders_equity, Some(1.9e9));
        assert_eq!(snapshot.trailing_dividend_rate, Some(1.12));
        assert_eq!(snapshot.title.as_deref(), Some("Example Corp"));
        assert_eq!(snapshot.industry.as_deref(), Some("Semiconductors"));
        assert_eq!(snapshot.total_assets, Some(3.3e9));
        assert_eq!(snapshot.long_term_debt, Some(6.0e8));
        assert_eq!(snapshot.controversy, Some(2.0));
    }

    #[test]
    fn test_roe_fraction_becomes_percentage_points() {
        let snapshot = build_snapshot("EXMP", &summary_payload()).unwrap();
        assert_relative_eq!(snapshot.historical_roe_pct.unwrap(), 14.5, epsilon = 1e-9);
    }

    #[test]
    fn test_free_cash_flow_sums_four_quarters() {
        let snapshot = build_snapshot("EXMP", &summary_payload()).unwrap();
        // 340M operating minus 50M capex
        assert_eq!(snapshot.free_cash_flow, Some(2.9e8));
    }

    #[test]
    fn test_missing_price_fails_the_snapshot() {
        let mut payload = summary_payload();
        payload["price"] = json!({});

        let err = build_snapshot("EXMP", &payload).unwrap_err();
        assert!(matches!(err, DataError::MissingData { .. }));
    }

    #[test]
    fn test_placeholder_growth_degrades_to_none() {
        let mut payload = summary_payload();
        payload["earningsTrend"]["trend"][1]["growth"] = json!("N/A");

        let snapshot = build_snapshot("EXMP", &payload).unwrap();
        assert_eq!(snapshot.growth_estimate, None);
        // The rest of the snapshot is unaffected.
        assert_eq!(snapshot.trailing_eps, Some(4.1));
    }

    #[test]
    fn test_missing_modules_disable_fields_individually() {
        let payload = json!({
            "price": { "regularMarketPrice": 10.0 }
        });

        let snapshot = build_snapshot("EXMP", &payload).unwrap();
        assert_eq!(snapshot.current_price, 10.0);
        assert_eq!(snapshot.trailing_eps, None);
        assert_eq!(snapshot.free_cash_flow, None);
        assert_eq!(snapshot.growth_estimate, None);
        assert!(snapshot.title.is_none());
    }
}
