//! Analysis modules.
//!
//! Aggregation runs synchronously over an already-loaded snapshot.

pub mod aggregator;

pub use aggregator::*;
