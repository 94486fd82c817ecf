//! GR-Replay: Guardian Recovery transaction replay.
//!
//! Reads a JSON script of ledger calls, applies them in order to a fresh
//! in-memory ledger under a manual logical clock, and reports each result.

pub mod runner;
pub mod script;

pub use runner::{Replayer, StepReport};
pub use script::{Operation, RequestRef, Script, Step};
