//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the recovery ledger depends on:
//! - Keyed storage for records, requests, endorsements and guardian profiles
//! - The externally supplied logical clock
//! - A sink for committed domain events
//!
//! Storage writes are never issued one at a time. The service collects every
//! write of a transaction into a `WriteBatch` and hands it to
//! `RecoveryStore::commit`, which must apply all of it or none of it.

use crate::domain::entities::{Endorsement, GuardianProfile, Record, RecoveryRequest};
use crate::domain::value_objects::{Principal, RecordId, RequestId, Tick};
use crate::errors::StoreError;
use crate::events::RecoveryEvent;

// =============================================================================
// WRITE BATCH
// =============================================================================

/// A single full-entity write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerWrite {
    /// Insert or replace a record.
    PutRecord { id: RecordId, record: Record },
    /// Insert or replace a request.
    PutRequest {
        id: RequestId,
        request: RecoveryRequest,
    },
    /// Insert an endorsement.
    PutEndorsement {
        request_id: RequestId,
        guardian: Principal,
        endorsement: Endorsement,
    },
    /// Insert or replace a guardian profile.
    PutGuardianProfile {
        principal: Principal,
        profile: GuardianProfile,
    },
    /// Advance the request-id counter.
    SetRequestNonce(u64),
}

/// All writes of one transaction, applied atomically.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: Vec<LedgerWrite>,
}

impl WriteBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a record write.
    pub fn put_record(&mut self, id: RecordId, record: Record) -> &mut Self {
        self.writes.push(LedgerWrite::PutRecord { id, record });
        self
    }

    /// Queue a request write.
    pub fn put_request(&mut self, id: RequestId, request: RecoveryRequest) -> &mut Self {
        self.writes.push(LedgerWrite::PutRequest { id, request });
        self
    }

    /// Queue an endorsement write.
    pub fn put_endorsement(
        &mut self,
        request_id: RequestId,
        guardian: Principal,
        endorsement: Endorsement,
    ) -> &mut Self {
        self.writes.push(LedgerWrite::PutEndorsement {
            request_id,
            guardian,
            endorsement,
        });
        self
    }

    /// Queue a guardian profile write.
    pub fn put_guardian_profile(
        &mut self,
        principal: Principal,
        profile: GuardianProfile,
    ) -> &mut Self {
        self.writes
            .push(LedgerWrite::PutGuardianProfile { principal, profile });
        self
    }

    /// Queue a counter update.
    pub fn set_request_nonce(&mut self, nonce: u64) -> &mut Self {
        self.writes.push(LedgerWrite::SetRequestNonce(nonce));
        self
    }

    /// Number of queued writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Queued writes in order.
    pub fn iter(&self) -> impl Iterator<Item = &LedgerWrite> {
        self.writes.iter()
    }

    /// Consumes the batch.
    #[must_use]
    pub fn into_writes(self) -> Vec<LedgerWrite> {
        self.writes
    }
}

// =============================================================================
// RECOVERY STORE
// =============================================================================

/// Keyed ledger storage.
///
/// ## Implementation Notes
///
/// - Reads return `Ok(None)` for absent keys; `Err` is reserved for backend
///   failures.
/// - `commit` must be all-or-nothing: a reader must never observe part of a
///   batch.
pub trait RecoveryStore: Send + Sync {
    /// Look up a record.
    fn get_record(&self, id: &RecordId) -> Result<Option<Record>, StoreError>;

    /// Look up a request.
    fn get_request(&self, id: &RequestId) -> Result<Option<RecoveryRequest>, StoreError>;

    /// Look up the endorsement of `guardian` on `request_id`.
    fn get_endorsement(
        &self,
        request_id: &RequestId,
        guardian: &Principal,
    ) -> Result<Option<Endorsement>, StoreError>;

    /// Look up a guardian profile.
    fn get_guardian_profile(
        &self,
        principal: &Principal,
    ) -> Result<Option<GuardianProfile>, StoreError>;

    /// Current value of the request-id counter (0 on a fresh ledger).
    fn request_nonce(&self) -> Result<u64, StoreError>;

    /// Apply every write in `batch` atomically.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Whether an endorsement exists for the pair.
    fn has_endorsement(
        &self,
        request_id: &RequestId,
        guardian: &Principal,
    ) -> Result<bool, StoreError> {
        Ok(self.get_endorsement(request_id, guardian)?.is_some())
    }

    /// Whether a record exists.
    fn record_exists(&self, id: &RecordId) -> Result<bool, StoreError> {
        Ok(self.get_record(id)?.is_some())
    }
}

// =============================================================================
// LOGICAL CLOCK
// =============================================================================

/// Externally supplied, non-decreasing logical clock.
pub trait LogicalClock: Send + Sync {
    /// Current tick.
    fn now(&self) -> Tick;
}

// =============================================================================
// EVENT SINK
// =============================================================================

/// Receives committed domain events.
///
/// Publishing happens after the batch is committed and cannot fail the
/// operation.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn publish(&self, event: RecoveryEvent);
}
