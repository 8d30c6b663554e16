//! Dataset generation for demos and end-to-end checks.

pub mod synthetic;

pub use synthetic::*;
