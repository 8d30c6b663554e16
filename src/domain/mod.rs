//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input tables (`Table`, `Series`) and test observations (`Observation`)
//! - selection outputs (`FitResult`, `SelectionSet`, `LineCoefficients`)
//! - mapping outputs (`Assignment`)
//! - run configuration (`RunConfig`, `PairingMode`)

pub mod types;

pub use types::*;
