//! # Guardian Recovery - Social Recovery Ledger
//!
//! **Architecture:** Hexagonal (domain / ports / adapters / service)
//!
//! ## Purpose
//!
//! A ledger of owned records, each protected by a guardian list and a
//! threshold. Anyone may open a recovery request naming a new owner; once a
//! threshold of distinct guardians has endorsed it within the request window,
//! ownership moves to the named principal in a single atomic transition.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | 3..=10 guardians, threshold 2..=guardians | `domain/services.rs` - `validate_guardian_config()` |
//! | One endorsement per (request, guardian) | `service.rs` - `endorse_recovery()`, `adapters/memory_store.rs` write-once endorsements |
//! | `endorsement_count == endorsers.len()` | `domain/invariants.rs` - `check_endorsement_count_invariant()` |
//! | Deadline fixed at `created_at + timeout` | `domain/entities.rs` - `RecoveryRequest::new()` |
//! | Expired iff `now >= expires_at` | `domain/entities.rs` - `RecoveryRequest::is_expired()` |
//! | Completion is terminal and atomic | `service.rs` - `complete_recovery()` single `WriteBatch` |
//! | Failed operations change nothing | `service.rs` - `transact()` validates before commit |
//!
//! ## Ports
//!
//! | Port | Trait | Purpose |
//! |------|-------|---------|
//! | Inbound | `GuardianRecoveryApi` | Register, recover, query, administer |
//! | Outbound | `RecoveryStore` | Keyed tables with atomic batch commit |
//! | Outbound | `LogicalClock` | Externally supplied tick counter |
//! | Outbound | `EventSink` | Committed domain events |
//!
//! ## Ledger Limits
//!
//! | Limit | Value |
//! |-------|-------|
//! | Request timeout | 144 ticks |
//! | Guardians per list | 3 ..= 10 |
//! | Minimum threshold | 2 |
//! | Metadata payload | 256 bytes |
//!
//! ## Usage Example
//!
//! ```
//! use guardian_recovery::prelude::*;
//!
//! let service = create_test_service();
//! let owner = Principal::new([0x01; 20]);
//! let guardians: Vec<_> = (0x11..=0x13).map(|b| Principal::new([b; 20])).collect();
//! let record = RecordId::new([0xAA; 32]);
//!
//! service
//!     .register_record(owner, record, EncryptedMetadata::default(), guardians.clone(), 2)
//!     .unwrap();
//! let request = service
//!     .initiate_recovery(owner, record, Principal::new([0x02; 20]))
//!     .unwrap();
//! service.endorse_recovery(guardians[0], request).unwrap();
//! service.endorse_recovery(guardians[1], request).unwrap();
//! let new_owner = service.complete_recovery(owner, request).unwrap();
//! assert_eq!(service.get_record(&record).unwrap().unwrap().owner, new_owner);
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        Endorsement, GuardianProfile, Record, RecoveryRequest, RecoveryStatus, RequestState,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        EncryptedMetadata, ParseBytesError, Principal, RecordId, RequestId, Tick,
    };

    // Domain services
    pub use crate::domain::services::{
        classify, derive_request_id, keccak256, recovery_status, required_threshold,
        validate_guardian_config, GuardianBounds, ThresholdPolicy,
    };

    // Invariants
    pub use crate::domain::invariants::{
        check_request_invariants, limits, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::GuardianRecoveryApi;
    pub use crate::ports::outbound::{
        EventSink, LedgerWrite, LogicalClock, RecoveryStore, WriteBatch,
    };

    // Events
    pub use crate::events::{topics, RecoveryEvent};

    // Errors
    pub use crate::errors::{ErrorKind, RecoveryError, StoreError};

    // Configuration
    pub use crate::config::{ConfigError, RecoveryConfig};

    // Adapters
    pub use crate::adapters::{InMemoryEventLog, InMemoryRecoveryStore, LedgerSnapshot, ManualClock};

    // Service
    pub use crate::service::{
        create_in_memory_service, create_test_service, GuardianRecoveryService,
        InMemoryRecoveryService, ServiceStats,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const CRATE_NAME: &str = "guardian-recovery";

// =============================================================================
// TESTS
// =============================================================================
