//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the driven ports.
//!
//! - `InMemoryRecoveryStore` - hash-map ledger with atomic batch commit
//! - `ManualClock` - host-driven logical clock
//! - `InMemoryEventLog` - audit trail of committed events
//! - `LedgerSnapshot` - JSON / binary image of the ledger

pub mod clock;
pub mod event_log;
pub mod memory_store;
pub mod snapshot;

pub use clock::*;
pub use event_log::*;
pub use memory_store::*;
pub use snapshot::*;
