//! The three intrinsic-value models.
//!
//! Each model is a pure function of its snapshot fields plus a
//! configuration of named constants. A model that cannot compute —
//! missing input, zero share count — yields `None` rather than an error,
//! and the remaining models still run.

pub mod dcf;
pub mod pe_reversion;
pub mod roe;

pub use dcf::{DcfConfig, DcfInputs, DcfModel};
pub use pe_reversion::{PeReversionConfig, PeReversionModel};
pub use roe::{RoeConfig, RoeInputs, RoeModel};

/// Round a per-share value to cents.
pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
