//! Hobart CLI binary.
//!
//! Provides the command-line interface for the Hobart screener.

mod integration;

use chrono::{Duration as ChronoDuration, Utc};
use clap::{Parser, Subcommand};
use hobart::universe::{Exchange, WatchEntry, Watchlist};
use hobart_data::FreshnessGate;
use hobart_output::export::{self, ExportFormat, ValuationExport};
use hobart_output::ranking::{self, RankedStock};
use hobart_output::report::Report;
use hobart_valuation::QualityTier;
use indicatif::{ProgressBar, ProgressStyle};
use integration::pipeline::{BatchSummary, EvaluationPipeline, SymbolOutcome};
use integration::store_manager;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hobart")]
#[command(about = "Hobart: intrinsic-value equity screener", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the results database (defaults to the platform data dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen the watchlist and store fresh valuations
    Screen {
        /// Directory of per-exchange symbol files (<code>.txt)
        #[arg(long, default_value = "symbols")]
        symbols_dir: PathBuf,

        /// Exchanges to include (defaults to nas,nyse,tsx)
        #[arg(long, value_delimiter = ',')]
        exchanges: Vec<Exchange>,

        /// Evaluate only a random subset of this size (0 = everything)
        #[arg(long, default_value = "0")]
        sample: usize,

        /// Ignore the staleness window and re-evaluate everything
        #[arg(long)]
        force: bool,

        /// Staleness window in hours
        #[arg(long, default_value = "12")]
        staleness_hours: i64,
    },

    /// Evaluate a single symbol and print the full report
    Analyze {
        /// Stock symbol
        symbol: String,

        /// Listing exchange
        #[arg(long, default_value = "nas")]
        exchange: Exchange,
    },

    /// Rank stored results by tier and value ratio
    Rank {
        /// Only include tiers at least this desirable
        #[arg(long, default_value = "okay")]
        min_quality: QualityTier,

        /// Maximum rows to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Export stored results to a file
    Export {
        /// Output file path
        path: PathBuf,

        /// Output format: csv, json or pretty
        #[arg(long, default_value = "csv")]
        format: String,

        /// Only include tiers at least this desirable
        #[arg(long, default_value = "unknown")]
        min_quality: QualityTier,
    },

    /// Run the periodic screen loop
    Watch {
        /// Directory of per-exchange symbol files
        #[arg(long, default_value = "symbols")]
        symbols_dir: PathBuf,

        /// Exchanges to include (defaults to nas,nyse,tsx)
        #[arg(long, value_delimiter = ',')]
        exchanges: Vec<Exchange>,

        /// Seconds to sleep between screening cycles
        #[arg(long, default_value = "43200")]
        interval_secs: u64,

        /// Staleness window in hours
        #[arg(long, default_value = "12")]
        staleness_hours: i64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let store = store_manager::open_store(cli.db.as_deref())?;

    match cli.command {
        Commands::Screen {
            symbols_dir,
            exchanges,
            sample,
            force,
            staleness_hours,
        } => {
            let gate = FreshnessGate::new(ChronoDuration::hours(staleness_hours));
            let pipeline = EvaluationPipeline::new(store, gate);
            screen(&pipeline, &symbols_dir, &exchanges, sample, force).await?;
        }
        Commands::Analyze { symbol, exchange } => {
            let pipeline = EvaluationPipeline::new(store, FreshnessGate::default());
            analyze(&pipeline, &symbol, exchange).await?;
        }
        Commands::Rank { min_quality, limit } => {
            let records = store.records_at_least(min_quality)?;
            let ranked = ranking::rank_records(&records);
            print_ranking(&ranked, limit);
        }
        Commands::Export {
            path,
            format,
            min_quality,
        } => {
            let format = parse_export_format(&format)?;
            let records = store.records_at_least(min_quality)?;
            let rows: Vec<ValuationExport> =
                records.iter().map(ValuationExport::from_record).collect();
            export::write_file(&rows, format, &path)?;
            println!("Wrote {} rows to {}", rows.len(), path.display());
        }
        Commands::Watch {
            symbols_dir,
            exchanges,
            interval_secs,
            staleness_hours,
        } => {
            let gate = FreshnessGate::new(ChronoDuration::hours(staleness_hours));
            let pipeline = EvaluationPipeline::new(store, gate);
            watch(&pipeline, &symbols_dir, &exchanges, interval_secs).await?;
        }
    }

    Ok(())
}

/// Screen a watchlist once.
async fn screen(
    pipeline: &EvaluationPipeline,
    symbols_dir: &std::path::Path,
    exchanges: &[Exchange],
    sample: usize,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = load_entries(pipeline, symbols_dir, exchanges)?;
    if entries.is_empty() {
        println!("No symbols to screen (checked {})", symbols_dir.display());
        return Ok(());
    }

    let entries = if sample > 0 {
        Watchlist::new(entries).sample(sample, &mut rand::thread_rng())
    } else {
        entries
    };

    let shutdown = install_shutdown_flag();
    let bar = progress_bar(entries.len());
    let summary = pipeline
        .run_batch(&entries, force, &shutdown, Some(&bar))
        .await?;
    bar.finish_and_clear();

    print_summary(&summary);
    Ok(())
}

/// Evaluate one symbol, bypassing the freshness gate, and print its
/// report.
async fn analyze(
    pipeline: &EvaluationPipeline,
    symbol: &str,
    exchange: Exchange,
) -> Result<(), Box<dyn std::error::Error>> {
    let entry = WatchEntry::new(symbol.to_uppercase(), exchange);

    match pipeline.process_symbol(&entry, true).await? {
        SymbolOutcome::Evaluated(_) => {
            let record = pipeline
                .store()
                .get_record(&entry.symbol, exchange.code())?
                .ok_or("evaluated record missing from store")?;
            println!("{}", Report::from_record(&record).to_json()?);
        }
        SymbolOutcome::Failed(reason) => {
            println!("Could not evaluate {}: {}", entry.symbol, reason);
        }
        SymbolOutcome::SkippedFresh => {
            println!("{} was skipped as fresh", entry.symbol);
        }
    }

    Ok(())
}

/// The periodic loop: a full gated screen, a second pass over the
/// better tiers, a ranking printout, then sleep.
async fn watch(
    pipeline: &EvaluationPipeline,
    symbols_dir: &std::path::Path,
    exchanges: &[Exchange],
    interval_secs: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = install_shutdown_flag();
    let mut cycle = 1u64;

    loop {
        info!(cycle, "starting screening cycle");

        // Reload symbol files each cycle to pick up edits.
        let entries = load_entries(pipeline, symbols_dir, exchanges)?;
        let summary = pipeline.run_batch(&entries, false, &shutdown, None).await?;
        print_summary(&summary);
        if summary.interrupted {
            break;
        }

        // Re-screen the better tiers so promising symbols stay current.
        let good = good_entries(pipeline)?;
        let summary = pipeline.run_batch(&good, false, &shutdown, None).await?;
        print_summary(&summary);
        if summary.interrupted {
            break;
        }

        let records = pipeline.store().records_at_least(QualityTier::Okay)?;
        print_ranking(&ranking::rank_records(&records), 10);

        info!(cycle, interval_secs, "cycle complete, sleeping");
        cycle += 1;
        if sleep_until_shutdown(interval_secs, &shutdown).await {
            break;
        }
    }

    info!("watch loop stopped");
    Ok(())
}

/// Load the watchlist, minus previously removed symbols, and mirror it
/// into the store.
fn load_entries(
    pipeline: &EvaluationPipeline,
    symbols_dir: &std::path::Path,
    exchanges: &[Exchange],
) -> Result<Vec<WatchEntry>, Box<dyn std::error::Error>> {
    let exchanges = if exchanges.is_empty() {
        vec![Exchange::Nasdaq, Exchange::Nyse, Exchange::Tsx]
    } else {
        exchanges.to_vec()
    };

    let watchlist = Watchlist::load_dir(symbols_dir, &exchanges)?;
    let removed: HashSet<String> = pipeline.store().removed_symbols()?.into_iter().collect();
    let watchlist = watchlist.without_removed(&removed);

    let now = Utc::now();
    for entry in watchlist.entries() {
        pipeline
            .store()
            .watchlist_add(&entry.symbol, entry.exchange.code(), now)?;
    }

    Ok(watchlist.entries().to_vec())
}

/// Stored symbols at or above the screening threshold, as watch entries.
fn good_entries(
    pipeline: &EvaluationPipeline,
) -> Result<Vec<WatchEntry>, Box<dyn std::error::Error>> {
    let symbols = pipeline.store().symbols_at_least(QualityTier::Okay)?;
    Ok(symbols
        .into_iter()
        .filter_map(|(symbol, code)| {
            Exchange::from_code(&code).map(|exchange| WatchEntry::new(symbol, exchange))
        })
        .collect())
}

fn parse_export_format(raw: &str) -> Result<ExportFormat, String> {
    match raw.to_lowercase().as_str() {
        "csv" => Ok(ExportFormat::Csv),
        "json" => Ok(ExportFormat::Json),
        "pretty" => Ok(ExportFormat::PrettyJson),
        _ => Err(format!("unknown export format: {raw}")),
    }
}

fn install_shutdown_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler = Arc::clone(&flag);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, finishing current symbol");
            handler.store(true, Ordering::SeqCst);
        }
    });
    flag
}

/// Sleep in one-second slices so a shutdown request is honored promptly.
/// Returns true if shutdown was requested.
async fn sleep_until_shutdown(secs: u64, shutdown: &AtomicBool) -> bool {
    for _ in 0..secs {
        if shutdown.load(Ordering::SeqCst) {
            return true;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    shutdown.load(Ordering::SeqCst)
}

fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .expect("valid progress template")
        .progress_chars("#>-"),
    );
    bar
}

fn print_summary(summary: &BatchSummary) {
    let note = if summary.interrupted {
        " (interrupted)"
    } else {
        ""
    };
    println!(
        "Evaluated {}, skipped {} as fresh, {} unobtainable{}",
        summary.evaluated, summary.skipped, summary.failed, note
    );
}

fn print_ranking(ranked: &[RankedStock], limit: usize) {
    if ranked.is_empty() {
        println!("No stored results match");
        return;
    }

    println!(
        "{:<8} {:<9} {:<8} {:>10} {:>12} {:>8}",
        "SYMBOL", "EXCHANGE", "QUALITY", "PRICE", "LOW VALUE", "RATIO"
    );
    for row in ranked.iter().take(limit) {
        println!(
            "{:<8} {:<9} {:<8} {:>10.2} {:>12} {:>8}",
            row.symbol,
            row.exchange,
            row.quality.label(),
            row.current_price,
            row.lowest_model_value
                .map_or_else(|| "-".to_string(), |v| format!("{v:.2}")),
            row.value_ratio
                .map_or_else(|| "-".to_string(), |r| format!("{r:.2}")),
        );
    }
}
