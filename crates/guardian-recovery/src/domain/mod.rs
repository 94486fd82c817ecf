//! # Domain Layer (Inner Hexagon)
//!
//! Pure business logic for the recovery ledger.
//! NO I/O, NO locking, NO clock access: the current tick is always passed in.

pub mod entities;
pub mod invariants;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use services::*;
pub use value_objects::*;
