#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod freshness;
pub mod retry;
pub mod store;
pub mod yahoo;

pub use error::{DataError, Result};
pub use freshness::{Freshness, FreshnessGate};
pub use retry::RetryPolicy;
pub use store::{StockRecord, ValuationStore};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
