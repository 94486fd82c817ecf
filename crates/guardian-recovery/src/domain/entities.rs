//! # Core Domain Entities
//!
//! Main business entities of the recovery ledger: records, guardian profiles,
//! recovery requests and endorsements, plus the derived request status.
//!
//! Every mutation is a full-record replace: callers clone the stored entity,
//! change fields on the copy and hand the copy back to the store inside a
//! `WriteBatch`.

use crate::domain::value_objects::{EncryptedMetadata, Principal, RecordId, Tick};
use serde::{Deserialize, Serialize};

// =============================================================================
// RECORD
// =============================================================================

/// An access-controlled record whose ownership can be recovered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Current owner.
    pub owner: Principal,
    /// Caller-encrypted payload, never inspected.
    pub metadata: EncryptedMetadata,
    /// Guardians allowed to endorse recovery of this record (ordered).
    pub guardians: Vec<Principal>,
    /// Endorsements required before a request becomes completable.
    pub threshold: u8,
    /// Logical tick at registration.
    pub created_at: Tick,
    /// Whether new recovery requests may be initiated.
    pub active: bool,
}

impl Record {
    /// Creates an active record owned by `owner`.
    #[must_use]
    pub fn new(
        owner: Principal,
        metadata: EncryptedMetadata,
        guardians: Vec<Principal>,
        threshold: u8,
        created_at: Tick,
    ) -> Self {
        Self {
            owner,
            metadata,
            guardians,
            threshold,
            created_at,
            active: true,
        }
    }

    /// Returns true if `who` is in this record's guardian list.
    #[must_use]
    pub fn is_guardian(&self, who: &Principal) -> bool {
        self.guardians.contains(who)
    }
}

// =============================================================================
// GUARDIAN PROFILE
// =============================================================================

/// Per-identity default guardian configuration.
///
/// Informational only: recovery eligibility is always decided by the
/// record's own guardian list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianProfile {
    /// Default guardians.
    pub guardians: Vec<Principal>,
    /// Default threshold.
    pub threshold: u8,
    /// Tick of the last `set_guardians` call.
    pub updated_at: Tick,
}

// =============================================================================
// RECOVERY REQUEST
// =============================================================================

/// A request to move a record to a new owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRequest {
    /// Record being recovered.
    pub record_id: RecordId,
    /// Whoever initiated the request.
    pub requester: Principal,
    /// Guardians that endorsed, in endorsement order.
    pub endorsers: Vec<Principal>,
    /// Always equal to `endorsers.len()`.
    pub endorsement_count: u8,
    /// Tick at initiation.
    pub created_at: Tick,
    /// First tick at which the request is no longer usable.
    pub expires_at: Tick,
    /// Set exactly once by a successful completion.
    pub completed: bool,
    /// Owner installed on completion.
    pub new_owner: Principal,
    /// Record threshold captured at initiation.
    pub threshold_at_initiation: u8,
}

impl RecoveryRequest {
    /// Creates an open request with no endorsements.
    #[must_use]
    pub fn new(
        record_id: RecordId,
        requester: Principal,
        new_owner: Principal,
        threshold_at_initiation: u8,
        created_at: Tick,
        timeout_ticks: Tick,
    ) -> Self {
        Self {
            record_id,
            requester,
            endorsers: Vec::new(),
            endorsement_count: 0,
            created_at,
            expires_at: created_at.saturating_add(timeout_ticks),
            completed: false,
            new_owner,
            threshold_at_initiation,
        }
    }

    /// A request is expired once `now` reaches `expires_at`.
    #[must_use]
    pub fn is_expired(&self, now: Tick) -> bool {
        now >= self.expires_at
    }

    /// Returns true if `guardian` already appears in the endorser list.
    #[must_use]
    pub fn has_endorser(&self, guardian: &Principal) -> bool {
        self.endorsers.contains(guardian)
    }

    /// Copy of this request with `guardian` appended as an endorser.
    #[must_use]
    pub fn with_endorsement(&self, guardian: Principal) -> Self {
        let mut next = self.clone();
        next.endorsers.push(guardian);
        next.endorsement_count = next.endorsement_count.saturating_add(1);
        next
    }

    /// Copy of this request marked completed.
    #[must_use]
    pub fn completed(&self) -> Self {
        let mut next = self.clone();
        next.completed = true;
        next
    }
}

// =============================================================================
// ENDORSEMENT
// =============================================================================

/// A guardian's one-time vote for a specific request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    /// Always true once stored.
    pub verified: bool,
    /// Tick the endorsement was recorded.
    pub timestamp: Tick,
}

impl Endorsement {
    /// A verified endorsement recorded at `timestamp`.
    #[must_use]
    pub fn verified_at(timestamp: Tick) -> Self {
        Self {
            verified: true,
            timestamp,
        }
    }
}

// =============================================================================
// DERIVED STATUS
// =============================================================================

/// Effective request state, derived on every read and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Collecting endorsements.
    Open,
    /// Threshold met, deadline not reached, not yet completed.
    Completable,
    /// Deadline reached without completion.
    Expired,
    /// Ownership transferred.
    Completed,
}

impl RequestState {
    /// Terminal states never change again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Expired | Self::Completed)
    }
}

/// Polling view of a request combined with its record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryStatus {
    /// Endorsements collected so far.
    pub collected: u8,
    /// Endorsements required right now.
    pub required: u8,
    /// Deadline reached.
    pub is_expired: bool,
    /// Ownership already transferred.
    pub is_completed: bool,
    /// Exactly the guard `complete_recovery` applies.
    pub can_complete: bool,
    /// Derived state.
    pub state: RequestState,
}

// =============================================================================
// TESTS
// =============================================================================
