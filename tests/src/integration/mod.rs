//! End-to-end recovery flows.

pub mod concurrency;
pub mod persistence;
pub mod properties;
