//! # In-Memory Recovery Store
//!
//! `RecoveryStore` backed by hash maps behind a single lock, so a batch is
//! applied entirely inside one write critical section.

use crate::adapters::snapshot::LedgerSnapshot;
use crate::config::RecoveryConfig;
use crate::domain::entities::{Endorsement, GuardianProfile, Record, RecoveryRequest};
use crate::domain::value_objects::{Principal, RecordId, RequestId};
use crate::errors::StoreError;
use crate::ports::outbound::{LedgerWrite, RecoveryStore, WriteBatch};
use std::collections::HashMap;
use std::sync::RwLock;

/// The four keyed tables plus the request-id counter.
#[derive(Debug, Default, Clone)]
pub(crate) struct LedgerTables {
    pub(crate) records: HashMap<RecordId, Record>,
    pub(crate) requests: HashMap<RequestId, RecoveryRequest>,
    pub(crate) endorsements: HashMap<(RequestId, Principal), Endorsement>,
    pub(crate) guardian_profiles: HashMap<Principal, GuardianProfile>,
    pub(crate) request_nonce: u64,
}

impl LedgerTables {
    fn apply(&mut self, write: LedgerWrite) {
        match write {
            LedgerWrite::PutRecord { id, record } => {
                self.records.insert(id, record);
            }
            LedgerWrite::PutRequest { id, request } => {
                self.requests.insert(id, request);
            }
            LedgerWrite::PutEndorsement {
                request_id,
                guardian,
                endorsement,
            } => {
                self.endorsements
                    .entry((request_id, guardian))
                    .or_insert(endorsement);
            }
            LedgerWrite::PutGuardianProfile { principal, profile } => {
                self.guardian_profiles.insert(principal, profile);
            }
            LedgerWrite::SetRequestNonce(nonce) => {
                self.request_nonce = self.request_nonce.max(nonce);
            }
        }
    }
}

/// In-memory implementation of `RecoveryStore`.
#[derive(Debug, Default)]
pub struct InMemoryRecoveryStore {
    tables: RwLock<LedgerTables>,
}

impl InMemoryRecoveryStore {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from a snapshot taken under the same `config`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the snapshot fails
    /// [`LedgerSnapshot::validate`].
    pub fn from_snapshot(snapshot: LedgerSnapshot, config: &RecoveryConfig) -> Result<Self, StoreError> {
        snapshot.validate(config)?;
        Ok(Self {
            tables: RwLock::new(snapshot.into_tables()),
        })
    }

    /// Capture the full ledger contents.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LockPoisoned` if a writer panicked.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(LedgerSnapshot::from_tables(&tables))
    }

    /// Number of stored requests (completed and expired included).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LockPoisoned` if a writer panicked.
    pub fn request_count(&self) -> Result<usize, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.requests.len())
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LockPoisoned` if a writer panicked.
    pub fn record_count(&self) -> Result<usize, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.records.len())
    }
}

impl RecoveryStore for InMemoryRecoveryStore {
    fn get_record(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.records.get(id).cloned())
    }

    fn get_request(&self, id: &RequestId) -> Result<Option<RecoveryRequest>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.requests.get(id).cloned())
    }

    fn get_endorsement(
        &self,
        request_id: &RequestId,
        guardian: &Principal,
    ) -> Result<Option<Endorsement>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.endorsements.get(&(*request_id, *guardian)).copied())
    }

    fn get_guardian_profile(
        &self,
        principal: &Principal,
    ) -> Result<Option<GuardianProfile>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.guardian_profiles.get(principal).cloned())
    }

    fn request_nonce(&self) -> Result<u64, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.request_nonce)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        for write in batch.into_writes() {
            tables.apply(write);
        }
        Ok(())
    }
}
