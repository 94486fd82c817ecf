//! Attack simulations against the recovery ledger.

pub mod authority;
