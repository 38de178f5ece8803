//! Staleness gating for re-evaluation.
//!
//! A symbol that was evaluated recently is skipped rather than
//! re-fetched; the decision is an explicit outcome, not an exception.

use chrono::{DateTime, Duration, Utc};

/// Outcome of a freshness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The last evaluation is recent enough; skip this symbol.
    Fresh,
    /// Never evaluated, or the staleness window has elapsed.
    Stale,
}

impl Freshness {
    /// Whether the symbol should be (re-)evaluated.
    pub fn needs_evaluation(self) -> bool {
        self == Self::Stale
    }
}

/// Decides, from a last-evaluation timestamp, whether re-evaluation may
/// be skipped.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessGate {
    staleness_window: Duration,
}

impl FreshnessGate {
    /// Default staleness window: 12 hours.
    pub const DEFAULT_WINDOW_SECS: i64 = 43_200;

    /// Gate with an explicit staleness window.
    pub const fn new(staleness_window: Duration) -> Self {
        Self { staleness_window }
    }

    /// The configured staleness window.
    pub const fn staleness_window(&self) -> Duration {
        self.staleness_window
    }

    /// Check a symbol's last evaluation against `now`.
    ///
    /// The window boundary is inclusive: a symbol evaluated exactly one
    /// window ago is already stale.
    pub fn check(&self, last_evaluated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Freshness {
        match last_evaluated {
            None => Freshness::Stale,
            Some(last) if now - last >= self.staleness_window => Freshness::Stale,
            Some(_) => Freshness::Fresh,
        }
    }
}

impl Default for FreshnessGate {
    fn default() -> Self {
        Self::new(Duration::seconds(Self::DEFAULT_WINDOW_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_never_evaluated_is_stale() {
        let gate = FreshnessGate::default();
        assert_eq!(gate.check(None, now()), Freshness::Stale);
        assert!(gate.check(None, now()).needs_evaluation());
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let gate = FreshnessGate::default();
        let last = now() - Duration::seconds(FreshnessGate::DEFAULT_WINDOW_SECS);
        assert_eq!(gate.check(Some(last), now()), Freshness::Stale);
    }

    #[test]
    fn test_one_second_inside_the_window_is_fresh() {
        let gate = FreshnessGate::default();
        let last = now() - Duration::seconds(FreshnessGate::DEFAULT_WINDOW_SECS - 1);
        assert_eq!(gate.check(Some(last), now()), Freshness::Fresh);
        assert!(!gate.check(Some(last), now()).needs_evaluation());
    }

    #[test]
    fn test_well_past_the_window_is_stale() {
        let gate = FreshnessGate::default();
        let last = now() - Duration::days(3);
        assert_eq!(gate.check(Some(last), now()), Freshness::Stale);
    }

    #[test]
    fn test_wider_window_keeps_symbols_fresh_longer() {
        let gate = FreshnessGate::new(Duration::hours(24));
        let last = now() - Duration::hours(18);
        assert_eq!(gate.check(Some(last), now()), Freshness::Fresh);

        let narrow = FreshnessGate::new(Duration::hours(12));
        assert_eq!(narrow.check(Some(last), now()), Freshness::Stale);
    }
}
