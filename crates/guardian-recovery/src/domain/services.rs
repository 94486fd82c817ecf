//! # Domain Services
//!
//! Pure functions over domain entities: request id derivation, guardian
//! configuration validation and the derived request state machine.

use crate::domain::entities::{Record, RecoveryRequest, RecoveryStatus, RequestState};
use crate::domain::invariants::limits;
use crate::domain::value_objects::{Principal, RequestId, Tick};
use crate::errors::RecoveryError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::collections::HashSet;

// =============================================================================
// REQUEST ID DERIVATION
// =============================================================================

/// Domain separator mixed into every request id.
const REQUEST_ID_DOMAIN: &[u8] = b"guardian-recovery/request";

/// Computes keccak256 hash.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Derives a request id from the ledger's request counter and the current tick.
///
/// The counter is strictly increasing, so ids never repeat within a ledger.
#[must_use]
pub fn derive_request_id(nonce: u64, now: Tick) -> RequestId {
    let mut preimage = Vec::with_capacity(REQUEST_ID_DOMAIN.len() + 16);
    preimage.extend_from_slice(REQUEST_ID_DOMAIN);
    preimage.extend_from_slice(&nonce.to_be_bytes());
    preimage.extend_from_slice(&now.to_be_bytes());
    RequestId::new(keccak256(&preimage))
}

// =============================================================================
// GUARDIAN CONFIGURATION
// =============================================================================

/// Allowed guardian list sizes and threshold floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianBounds {
    /// Fewest guardians a list may hold.
    pub min_guardians: usize,
    /// Most guardians a list may hold.
    pub max_guardians: usize,
    /// Lowest allowed threshold.
    pub min_threshold: u8,
}

impl Default for GuardianBounds {
    fn default() -> Self {
        Self {
            min_guardians: limits::MIN_GUARDIANS,
            max_guardians: limits::MAX_GUARDIANS,
            min_threshold: limits::MIN_THRESHOLD,
        }
    }
}

/// Validates a guardian list and threshold.
///
/// # Errors
///
/// `InvalidGuardianConfig` when the list size is outside the bounds, the
/// threshold is outside `[min_threshold, guardians.len()]`, or a guardian is
/// listed twice.
pub fn validate_guardian_config(
    guardians: &[Principal],
    threshold: u8,
    bounds: &GuardianBounds,
) -> Result<(), RecoveryError> {
    let count = guardians.len();
    if count < bounds.min_guardians || count > bounds.max_guardians {
        return Err(RecoveryError::invalid_config(format!(
            "{count} guardians, expected {}..={}",
            bounds.min_guardians, bounds.max_guardians
        )));
    }

    if threshold < bounds.min_threshold || usize::from(threshold) > count {
        return Err(RecoveryError::invalid_config(format!(
            "threshold {threshold}, expected {}..={count}",
            bounds.min_threshold
        )));
    }

    let mut seen = HashSet::with_capacity(count);
    if let Some(dup) = guardians.iter().find(|g| !seen.insert(**g)) {
        return Err(RecoveryError::invalid_config(format!(
            "guardian {dup} listed more than once"
        )));
    }

    Ok(())
}

// =============================================================================
// THRESHOLD POLICY
// =============================================================================

/// Which threshold governs completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Re-read the record's threshold at completion time.
    #[default]
    Live,
    /// Use the threshold captured when the request was initiated.
    SnapshotAtInitiation,
}

/// Threshold the request must meet right now under `policy`.
#[must_use]
pub fn required_threshold(
    request: &RecoveryRequest,
    record: &Record,
    policy: ThresholdPolicy,
) -> u8 {
    match policy {
        ThresholdPolicy::Live => record.threshold,
        ThresholdPolicy::SnapshotAtInitiation => request.threshold_at_initiation,
    }
}

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Derives the effective state of a request.
///
/// Completion wins over expiry: a completed request stays `Completed` after
/// its deadline.
#[must_use]
pub fn classify(request: &RecoveryRequest, required: u8, now: Tick) -> RequestState {
    if request.completed {
        RequestState::Completed
    } else if request.is_expired(now) {
        RequestState::Expired
    } else if request.endorsement_count >= required {
        RequestState::Completable
    } else {
        RequestState::Open
    }
}

/// Builds the polling view of a request.
#[must_use]
pub fn recovery_status(request: &RecoveryRequest, required: u8, now: Tick) -> RecoveryStatus {
    let state = classify(request, required, now);
    RecoveryStatus {
        collected: request.endorsement_count,
        required,
        is_expired: request.is_expired(now),
        is_completed: request.completed,
        can_complete: state == RequestState::Completable,
        state,
    }
}

// =============================================================================
// TESTS
// =============================================================================
