//! Mathematical utilities: line fitting and residual statistics.

pub mod line;

pub use line::*;
