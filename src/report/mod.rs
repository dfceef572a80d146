//! Result reporting.
//!
//! This module renders the console report and writes the on-disk
//! summary table.

pub mod generator;

pub use generator::*;
