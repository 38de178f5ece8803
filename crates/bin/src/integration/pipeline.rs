//! Per-symbol evaluation pipeline.
//!
//! One symbol at a time: consult the freshness gate, fetch a snapshot
//! under the retry policy, run the valuation engine, persist the record.
//! A symbol that cannot be fetched is recorded with its failure reason
//! and never aborts the batch.

use chrono::Utc;
use hobart::universe::WatchEntry;
use hobart_data::yahoo::YahooSnapshotProvider;
use hobart_data::{DataError, FreshnessGate, RetryPolicy, StockRecord, ValuationStore};
use hobart_valuation::{QualityTier, ValuationEngine};
use indicatif::ProgressBar;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

/// What happened to one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SymbolOutcome {
    /// Evaluated and stored with the given tier.
    Evaluated(QualityTier),
    /// Last evaluation is still fresh; nothing fetched.
    SkippedFresh,
    /// Snapshot unobtainable; failure recorded with this reason.
    Failed(String),
}

/// Tally of one batch run.
#[derive(Debug, Default, Clone)]
pub(crate) struct BatchSummary {
    /// Symbols evaluated and stored.
    pub(crate) evaluated: usize,
    /// Symbols skipped as fresh.
    pub(crate) skipped: usize,
    /// Symbols whose snapshot was unobtainable.
    pub(crate) failed: usize,
    /// Whether a shutdown request stopped the batch early.
    pub(crate) interrupted: bool,
}

/// Sequential evaluation pipeline over watchlist entries.
pub(crate) struct EvaluationPipeline {
    provider: YahooSnapshotProvider,
    store: ValuationStore,
    engine: ValuationEngine,
    gate: FreshnessGate,
    retry: RetryPolicy,
}

impl std::fmt::Debug for EvaluationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationPipeline")
            .field("gate", &self.gate)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl EvaluationPipeline {
    /// Pipeline with default provider, engine and retry policy.
    pub(crate) fn new(store: ValuationStore, gate: FreshnessGate) -> Self {
        Self {
            provider: YahooSnapshotProvider::new(),
            store,
            engine: ValuationEngine::new(),
            gate,
            retry: RetryPolicy::default(),
        }
    }

    /// The underlying store.
    pub(crate) fn store(&self) -> &ValuationStore {
        &self.store
    }

    /// Process one symbol end to end.
    ///
    /// Errors returned here are store failures; fetch failures are
    /// absorbed into [`SymbolOutcome::Failed`].
    pub(crate) async fn process_symbol(
        &self,
        entry: &WatchEntry,
        force: bool,
    ) -> Result<SymbolOutcome, DataError> {
        let exchange = entry.exchange.code();
        let last = self.store.last_evaluated(&entry.symbol, exchange)?;

        if !force && !self.gate.check(last, Utc::now()).needs_evaluation() {
            info!(symbol = %entry.symbol, "recently evaluated, skipping");
            return Ok(SymbolOutcome::SkippedFresh);
        }

        let yahoo_symbol = entry.exchange.yahoo_symbol(&entry.symbol);
        let fetched = self
            .retry
            .run(|| self.provider.fetch_snapshot(&yahoo_symbol))
            .await;

        match fetched {
            Ok(mut snapshot) => {
                snapshot.last_evaluated = last;
                let valuation = self.engine.evaluate(&snapshot, Utc::now());
                info!(
                    symbol = %entry.symbol,
                    exchange = %entry.exchange,
                    quality = %valuation.quality,
                    pe = ?valuation.pe_value,
                    dcf = ?valuation.dcf_value,
                    roe = ?valuation.roe_value,
                    "evaluated"
                );

                let quality = valuation.quality;
                let record =
                    StockRecord::new(entry.symbol.clone(), exchange, snapshot, valuation);
                self.store.upsert_record(&record)?;
                Ok(SymbolOutcome::Evaluated(quality))
            }
            Err(err) => {
                error!(symbol = %entry.symbol, error = %err, "snapshot unobtainable");
                let reason = err.to_string();
                self.store
                    .record_failure(&entry.symbol, exchange, &reason, Utc::now())?;
                Ok(SymbolOutcome::Failed(reason))
            }
        }
    }

    /// Process a batch sequentially.
    ///
    /// The shutdown flag is checked between symbols, never
    /// mid-computation; setting it finishes the current symbol and stops.
    pub(crate) async fn run_batch(
        &self,
        entries: &[WatchEntry],
        force: bool,
        shutdown: &AtomicBool,
        progress: Option<&ProgressBar>,
    ) -> Result<BatchSummary, DataError> {
        let mut summary = BatchSummary::default();

        for (i, entry) in entries.iter().enumerate() {
            if shutdown.load(Ordering::SeqCst) {
                info!("shutdown requested, stopping after {} symbols", i);
                summary.interrupted = true;
                break;
            }

            if let Some(bar) = progress {
                bar.set_message(entry.symbol.clone());
            }

            match self.process_symbol(entry, force).await? {
                SymbolOutcome::Evaluated(_) => summary.evaluated += 1,
                SymbolOutcome::SkippedFresh => summary.skipped += 1,
                SymbolOutcome::Failed(_) => summary.failed += 1,
            }

            if let Some(bar) = progress {
                bar.inc(1);
            }
        }

        Ok(summary)
    }
}
