//! Test-point mapping: nearest selected function per observation.

pub mod mapper;

pub use mapper::*;
