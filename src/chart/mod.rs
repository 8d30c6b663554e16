//! Chart rendering to files.

pub mod svg;

pub use svg::*;
