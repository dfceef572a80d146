//! Incident aggregation.
//!
//! The three reduction passes over the loaded incident table live in
//! the aggregator submodule.

pub mod aggregator;

pub use aggregator::*;
