//! # Guardian Recovery Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/      # End-to-end recovery flows through the public API
//! │   ├── scenarios.rs  # Canonical happy/failure paths
//! │   ├── persistence.rs# Snapshot save / restore mid-recovery
//! │   ├── concurrency.rs# Contending callers on one service
//! │   └── properties.rs # proptest / randomized orderings
//! │
//! └── exploits/         # Attack simulations
//!     ├── replay.rs     # Endorsement and completion replays
//!     └── authority.rs  # Role and identity abuse
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p gr-tests
//!
//! # By category
//! cargo test -p gr-tests integration::
//! cargo test -p gr-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p gr-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod exploits;
pub mod fixtures;
pub mod integration;
