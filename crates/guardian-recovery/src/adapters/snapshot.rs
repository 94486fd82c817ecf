//! # Ledger Snapshots
//!
//! Serializable image of the whole in-memory ledger.
//!
//! Two encodings:
//! - JSON (`to_json` / `from_json`) for inspection and the replay tool
//! - Binary (`to_bytes` / `from_bytes`): `[MAGIC][bincode payload]`
//!
//! Entries are sorted by key so equal ledgers produce identical snapshots.
//!
//! Decoding only checks the format. `validate` checks the ledger contents and
//! runs on every restore, so a hand-edited or foreign snapshot can never put
//! the service into a state where `get_status` and `complete_recovery`
//! disagree.

use crate::adapters::memory_store::LedgerTables;
use crate::config::RecoveryConfig;
use crate::domain::entities::{Endorsement, GuardianProfile, Record, RecoveryRequest};
use crate::domain::invariants::{
    check_endorsers_are_guardians_invariant, check_fixed_deadline_invariant,
    check_guardian_bounds_invariant, check_request_invariants, InvariantCheckResult,
};
use crate::domain::value_objects::{Principal, RecordId, RequestId};
use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Magic bytes prefixed to binary snapshots.
const SNAPSHOT_MAGIC: &[u8; 8] = b"GRLEDG\x00\x01";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Stored record with its key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub id: RecordId,
    pub record: Record,
}

/// Stored request with its key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEntry {
    pub id: RequestId,
    pub request: RecoveryRequest,
}

/// Stored endorsement with its key pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsementEntry {
    pub request_id: RequestId,
    pub guardian: Principal,
    pub endorsement: Endorsement,
}

/// Stored guardian profile with its key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianProfileEntry {
    pub principal: Principal,
    pub profile: GuardianProfile,
}

/// Full ledger image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Format version.
    pub version: u32,
    /// Request-id counter.
    pub request_nonce: u64,
    pub records: Vec<RecordEntry>,
    pub requests: Vec<RequestEntry>,
    pub endorsements: Vec<EndorsementEntry>,
    pub guardian_profiles: Vec<GuardianProfileEntry>,
}

impl LedgerSnapshot {
    pub(crate) fn from_tables(tables: &LedgerTables) -> Self {
        let mut records: Vec<_> = tables
            .records
            .iter()
            .map(|(id, record)| RecordEntry {
                id: *id,
                record: record.clone(),
            })
            .collect();
        records.sort_by_key(|e| e.id);

        let mut requests: Vec<_> = tables
            .requests
            .iter()
            .map(|(id, request)| RequestEntry {
                id: *id,
                request: request.clone(),
            })
            .collect();
        requests.sort_by_key(|e| e.id);

        let mut endorsements: Vec<_> = tables
            .endorsements
            .iter()
            .map(|((request_id, guardian), endorsement)| EndorsementEntry {
                request_id: *request_id,
                guardian: *guardian,
                endorsement: *endorsement,
            })
            .collect();
        endorsements.sort_by_key(|e| (e.request_id, e.guardian));

        let mut guardian_profiles: Vec<_> = tables
            .guardian_profiles
            .iter()
            .map(|(principal, profile)| GuardianProfileEntry {
                principal: *principal,
                profile: profile.clone(),
            })
            .collect();
        guardian_profiles.sort_by_key(|e| e.principal);

        Self {
            version: SNAPSHOT_VERSION,
            request_nonce: tables.request_nonce,
            records,
            requests,
            endorsements,
            guardian_profiles,
        }
    }

    pub(crate) fn into_tables(self) -> LedgerTables {
        LedgerTables {
            records: self.records.into_iter().map(|e| (e.id, e.record)).collect(),
            requests: self
                .requests
                .into_iter()
                .map(|e| (e.id, e.request))
                .collect(),
            endorsements: self
                .endorsements
                .into_iter()
                .map(|e| ((e.request_id, e.guardian), e.endorsement))
                .collect(),
            guardian_profiles: self
                .guardian_profiles
                .into_iter()
                .map(|e| (e.principal, e.profile))
                .collect(),
            request_nonce: self.request_nonce,
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Parse JSON produced by `to_json`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` on malformed JSON or an unknown
    /// format version.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Binary encoding: `[MAGIC][bincode]`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let payload =
            bincode::serialize(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut buf = Vec::with_capacity(SNAPSHOT_MAGIC.len() + payload.len());
        buf.extend_from_slice(SNAPSHOT_MAGIC);
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Decode bytes produced by `to_bytes`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` on a missing magic prefix, a
    /// malformed payload or an unknown format version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let payload = bytes
            .strip_prefix(SNAPSHOT_MAGIC.as_slice())
            .ok_or_else(|| StoreError::Serialization("bad snapshot magic".to_string()))?;
        let snapshot: Self =
            bincode::deserialize(payload).map_err(|e| StoreError::Serialization(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Check the ledger contents against `config`.
    ///
    /// - No key appears twice in any table
    /// - Every record meets the guardian bounds and the metadata bound
    /// - Every request passes the structural invariants, keeps the deadline
    ///   `created_at + timeout`, and targets a stored record
    /// - Endorsers of a request whose record was registered strictly before
    ///   it are guardians of that record (a later re-registration may
    ///   legitimately replace the list)
    /// - Endorsement entries and endorser lists describe the same set
    /// - The request-id counter is at least the number of requests
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` naming the first violation.
    pub fn validate(&self, config: &RecoveryConfig) -> Result<(), StoreError> {
        self.check_version()?;

        let bounds = config.guardian_bounds();
        let mut records: HashMap<RecordId, &Record> = HashMap::with_capacity(self.records.len());
        for entry in &self.records {
            if records.insert(entry.id, &entry.record).is_some() {
                return Err(invalid(format!("duplicate record {}", entry.id)));
            }
            if !check_guardian_bounds_invariant(&entry.record, &bounds) {
                return Err(invalid(format!(
                    "record {} has {} guardians with threshold {}",
                    entry.id,
                    entry.record.guardians.len(),
                    entry.record.threshold
                )));
            }
            if entry.record.metadata.len() > config.max_metadata_len {
                return Err(invalid(format!("record {} metadata too large", entry.id)));
            }
        }

        let mut requests: HashMap<RequestId, &RecoveryRequest> =
            HashMap::with_capacity(self.requests.len());
        for entry in &self.requests {
            let request = &entry.request;
            if requests.insert(entry.id, request).is_some() {
                return Err(invalid(format!("duplicate request {}", entry.id)));
            }
            if let InvariantCheckResult::Invalid(violations) = check_request_invariants(request) {
                let detail = violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(invalid(format!("request {}: {detail}", entry.id)));
            }
            if !check_fixed_deadline_invariant(request, config.request_timeout_ticks) {
                return Err(invalid(format!(
                    "request {} deadline {} is not created_at {} + {}",
                    entry.id, request.expires_at, request.created_at, config.request_timeout_ticks
                )));
            }
            let record = records.get(&request.record_id).ok_or_else(|| {
                invalid(format!(
                    "request {} targets unknown record {}",
                    entry.id, request.record_id
                ))
            })?;
            if record.created_at < request.created_at
                && !check_endorsers_are_guardians_invariant(request, record)
            {
                return Err(invalid(format!(
                    "request {} endorsed by a non-guardian",
                    entry.id
                )));
            }
        }

        let mut endorsed = HashSet::with_capacity(self.endorsements.len());
        for entry in &self.endorsements {
            if !endorsed.insert((entry.request_id, entry.guardian)) {
                return Err(invalid(format!(
                    "duplicate endorsement {} by {}",
                    entry.request_id, entry.guardian
                )));
            }
            let request = requests.get(&entry.request_id).ok_or_else(|| {
                invalid(format!("endorsement for unknown request {}", entry.request_id))
            })?;
            if !request.has_endorser(&entry.guardian) {
                return Err(invalid(format!(
                    "endorsement by {} missing from request {}",
                    entry.guardian, entry.request_id
                )));
            }
        }
        for entry in &self.requests {
            if let Some(guardian) = entry
                .request
                .endorsers
                .iter()
                .find(|g| !endorsed.contains(&(entry.id, **g)))
            {
                return Err(invalid(format!(
                    "request {} lists {guardian} without an endorsement entry",
                    entry.id
                )));
            }
        }

        let request_count = u64::try_from(self.requests.len()).unwrap_or(u64::MAX);
        if self.request_nonce < request_count {
            return Err(invalid(format!(
                "request counter {} below request count {request_count}",
                self.request_nonce
            )));
        }

        Ok(())
    }

    fn check_version(&self) -> Result<(), StoreError> {
        if self.version == SNAPSHOT_VERSION {
            Ok(())
        } else {
            Err(StoreError::Serialization(format!(
                "unsupported snapshot version {}",
                self.version
            )))
        }
    }
}

fn invalid(reason: String) -> StoreError {
    StoreError::Serialization(format!("invalid snapshot: {reason}"))
}
