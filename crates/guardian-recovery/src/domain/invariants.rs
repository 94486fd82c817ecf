//! # Domain Invariants
//!
//! Invariants that MUST hold for every stored record and request.
//! The service checks the structural request invariants before each commit;
//! a violation aborts the transaction as an internal error.
//!
//! - Guardian list size and threshold stay within bounds
//! - Endorsement count equals the endorser list length
//! - No guardian appears twice among a request's endorsers
//! - Every endorser is a guardian of the target record
//! - The endorser list never exceeds its capacity
//! - The deadline is exactly `created_at + timeout`

use crate::domain::entities::{Record, RecoveryRequest};
use crate::domain::services::GuardianBounds;
use crate::domain::value_objects::Tick;
use std::collections::HashSet;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Guardian list size and threshold are within `bounds`.
#[must_use]
pub fn check_guardian_bounds_invariant(record: &Record, bounds: &GuardianBounds) -> bool {
    let count = record.guardians.len();
    (bounds.min_guardians..=bounds.max_guardians).contains(&count)
        && record.threshold >= bounds.min_threshold
        && usize::from(record.threshold) <= count
}

/// Endorsement count equals the endorser list length.
#[must_use]
pub fn check_endorsement_count_invariant(request: &RecoveryRequest) -> bool {
    usize::from(request.endorsement_count) == request.endorsers.len()
}

/// No guardian counted twice.
#[must_use]
pub fn check_unique_endorsers_invariant(request: &RecoveryRequest) -> bool {
    let mut seen = HashSet::with_capacity(request.endorsers.len());
    request.endorsers.iter().all(|g| seen.insert(*g))
}

/// Every endorser belongs to the record's current guardian list.
///
/// Only meaningful while the guardian list is unchanged since the
/// endorsements were recorded; re-registration can replace the list.
#[must_use]
pub fn check_endorsers_are_guardians_invariant(request: &RecoveryRequest, record: &Record) -> bool {
    request.endorsers.iter().all(|g| record.is_guardian(g))
}

/// Endorser list within capacity.
#[must_use]
pub fn check_endorsement_capacity_invariant(request: &RecoveryRequest) -> bool {
    request.endorsers.len() <= limits::MAX_ENDORSEMENTS
}

/// Deadline fixed at creation.
#[must_use]
pub fn check_fixed_deadline_invariant(request: &RecoveryRequest, timeout_ticks: Tick) -> bool {
    request.expires_at == request.created_at.saturating_add(timeout_ticks)
}

/// A completed request met the threshold that governed its completion.
#[must_use]
pub fn check_completion_threshold_invariant(request: &RecoveryRequest, required: u8) -> bool {
    !request.completed || request.endorsement_count >= required
}

/// Check the structural request invariants at once.
///
/// Covers the endorsement count, endorser uniqueness and capacity. The
/// deadline and guardian-membership checks depend on configuration and on the
/// record's current guardian list, so they are exposed separately.
#[must_use]
pub fn check_request_invariants(request: &RecoveryRequest) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_endorsement_count_invariant(request) {
        violations.push(InvariantViolation::CountMismatch {
            count: request.endorsement_count,
            endorsers: request.endorsers.len(),
        });
    }

    if !check_unique_endorsers_invariant(request) {
        violations.push(InvariantViolation::DuplicateEndorser);
    }

    if !check_endorsement_capacity_invariant(request) {
        violations.push(InvariantViolation::CapacityExceeded {
            endorsers: request.endorsers.len(),
            max: limits::MAX_ENDORSEMENTS,
        });
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Count and list disagree.
    CountMismatch { count: u8, endorsers: usize },
    /// A guardian appears twice.
    DuplicateEndorser,
    /// Endorser list over capacity.
    CapacityExceeded { endorsers: usize, max: usize },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CountMismatch { count, endorsers } => {
                write!(f, "endorsement count {count} != {endorsers} endorsers")
            }
            Self::DuplicateEndorser => write!(f, "guardian endorsed twice"),
            Self::CapacityExceeded { endorsers, max } => {
                write!(f, "endorser list over capacity: {endorsers} > {max}")
            }
        }
    }
}

// =============================================================================
// LEDGER LIMIT CONSTANTS
// =============================================================================

/// Fixed ledger limits.
pub mod limits {
    /// Request lifetime in logical ticks.
    pub const DEFAULT_REQUEST_TIMEOUT_TICKS: u64 = 144;

    /// Fewest guardians per list.
    pub const MIN_GUARDIANS: usize = 3;

    /// Most guardians per list.
    pub const MAX_GUARDIANS: usize = 10;

    /// Lowest threshold.
    pub const MIN_THRESHOLD: u8 = 2;

    /// Metadata payload bound in bytes.
    pub const MAX_METADATA_LEN: usize = 256;

    /// Endorser list capacity (equal to the largest guardian list).
    pub const MAX_ENDORSEMENTS: usize = 10;
}

// =============================================================================
// TESTS
// =============================================================================
