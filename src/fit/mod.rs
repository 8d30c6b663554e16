//! Ideal-function selection.
//!
//! Responsibilities:
//!
//! - squared-deviation matrix between the ideal catalog and training series (parallel)
//! - aggregate scoring and stable ranking of candidates
//! - line fit + training error for each selected candidate

pub mod selection;

pub use selection::*;
