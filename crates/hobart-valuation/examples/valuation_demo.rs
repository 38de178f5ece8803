//! Evaluate a hand-built snapshot and print the model breakdown.
//!
//! Run with: cargo run --example valuation_demo -p hobart-valuation

use chrono::Utc;
use hobart_valuation::{StockSnapshot, ValuationEngine};

fn main() {
    let snapshot = StockSnapshot {
        current_price: 42.50,
        trailing_eps: Some(4.10),
        historical_pe: Some(14.2),
        growth_estimate: Some(0.07),
        free_cash_flow: Some(310_000_000.0),
        cash_and_equivalents: Some(540_000_000.0),
        total_liabilities: Some(1_250_000_000.0),
        shares_outstanding: Some(95_000_000.0),
        stockholders_equity: Some(1_900_000_000.0),
        historical_roe_pct: Some(14.5),
        trailing_dividend_rate: Some(1.12),
        title: Some("Demo Industrials Inc.".to_string()),
        ..Default::default()
    };

    let engine = ValuationEngine::new();
    let result = engine.evaluate(&snapshot, Utc::now());

    println!("{}", snapshot.title.as_deref().unwrap_or("(unnamed)"));
    println!("  current price: ${:.2}", snapshot.current_price);
    println!("  P/E reversion: {}", format_value(result.pe_value));
    println!("  DCF:           {}", format_value(result.dcf_value));
    println!("  ROE:           {}", format_value(result.roe_value));
    println!("  quality:       {}", result.quality);
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("${v:.2}"))
}
