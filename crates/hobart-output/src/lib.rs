#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod ranking;
pub mod report;

pub use export::{ExportError, ExportFormat, ValuationExport};
pub use ranking::{RankedStock, rank_records};
pub use report::{Report, ReportBuilder, ReportError};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
