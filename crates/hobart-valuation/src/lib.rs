#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod classifier;
pub mod engine;
pub mod growth;
pub mod models;
pub mod numeric;
pub mod snapshot;

pub use classifier::{QualityClassifier, QualityTier};
pub use engine::{ValuationEngine, ValuationResult};
pub use models::{DcfInputs, DcfModel, PeReversionModel, RoeInputs, RoeModel};
pub use snapshot::{NewsItem, StockSnapshot};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
