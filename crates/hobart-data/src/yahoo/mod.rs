//! Yahoo Finance data fetching.

pub mod news;
pub mod snapshot;

pub use snapshot::YahooSnapshotProvider;
