//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the recovery ledger.
//!
//! - **Driving Port (Inbound)**: `GuardianRecoveryApi`
//! - **Driven Ports (Outbound)**: `RecoveryStore`, `LogicalClock`, `EventSink`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
