//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - assignment and table exports (CSV) (`export`)
//! - selection JSON read/write (`selection_file`)

pub mod export;
pub mod ingest;
pub mod selection_file;

pub use export::*;
pub use ingest::*;
pub use selection_file::*;
