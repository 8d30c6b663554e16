//! `ideal-fit` library crate.
//!
//! Selects the ideal functions that best match a set of training series, fits
//! a line per selected function, and assigns test points to the nearest one.
//!
//! The binary (`ideal`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the selector and mapper are reusable without the CLI
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod chart;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod map;
pub mod math;
pub mod plot;
pub mod report;
