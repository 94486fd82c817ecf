//! # Guardian Recovery Service
//!
//! Implements `GuardianRecoveryApi` over the driven ports.
//!
//! ## Transaction Model
//!
//! Every mutating operation is one transaction:
//!
//! 1. Take the write side of the transaction gate
//! 2. Read the logical clock once
//! 3. Read and validate; any failure returns before anything is written
//! 4. Collect all writes into one `WriteBatch` and commit it atomically
//! 5. Publish the resulting events
//!
//! Reads take the read side of the gate, so they never observe a
//! half-applied transaction even on a multi-threaded host.

use crate::adapters::{InMemoryEventLog, InMemoryRecoveryStore, ManualClock};
use crate::config::{ConfigError, RecoveryConfig};
use crate::domain::entities::{
    Endorsement, GuardianProfile, Record, RecoveryRequest, RecoveryStatus,
};
use crate::domain::invariants::{
    check_completion_threshold_invariant, check_request_invariants, limits, InvariantCheckResult,
};
use crate::domain::services::{
    derive_request_id, recovery_status, required_threshold, validate_guardian_config,
};
use crate::domain::value_objects::{EncryptedMetadata, Principal, RecordId, RequestId, Tick};
use crate::errors::RecoveryError;
use crate::events::RecoveryEvent;
use crate::ports::inbound::GuardianRecoveryApi;
use crate::ports::outbound::{EventSink, LogicalClock, RecoveryStore, WriteBatch};

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Statistics for the recovery service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Committed transactions.
    pub transactions_committed: u64,
    /// Operations rejected before commit.
    pub rejected_operations: u64,
    /// Records registered (overwrites included).
    pub records_registered: u64,
    /// Guardian profiles stored.
    pub profiles_configured: u64,
    /// Recovery requests opened.
    pub requests_initiated: u64,
    /// Endorsements recorded.
    pub endorsements_recorded: u64,
    /// Ownership transfers.
    pub recoveries_completed: u64,
    /// Pause / reactivate calls committed.
    pub admin_actions: u64,
}

impl ServiceStats {
    fn record_event(&mut self, event: &RecoveryEvent) {
        match event {
            RecoveryEvent::RecordRegistered { .. } => self.records_registered += 1,
            RecoveryEvent::GuardiansConfigured { .. } => self.profiles_configured += 1,
            RecoveryEvent::RecoveryInitiated { .. } => self.requests_initiated += 1,
            RecoveryEvent::RecoveryEndorsed { .. } => self.endorsements_recorded += 1,
            RecoveryEvent::RecoveryCompleted { .. } => self.recoveries_completed += 1,
            RecoveryEvent::RecordPaused { .. } | RecoveryEvent::RecordReactivated { .. } => {
                self.admin_actions += 1;
            }
        }
    }
}

/// Output of a validated transaction, not yet committed.
struct Transition<T> {
    output: T,
    batch: WriteBatch,
    events: Vec<RecoveryEvent>,
}

impl<T> Transition<T> {
    fn new(output: T, batch: WriteBatch, event: RecoveryEvent) -> Self {
        Self {
            output,
            batch,
            events: vec![event],
        }
    }
}

/// The recovery ledger service.
#[derive(Debug)]
pub struct GuardianRecoveryService<S: RecoveryStore, C: LogicalClock, E: EventSink> {
    /// Ledger configuration.
    config: RecoveryConfig,
    /// Keyed ledger storage.
    store: Arc<S>,
    /// External logical clock.
    clock: Arc<C>,
    /// Committed event sink.
    events: Arc<E>,
    /// Serializes transactions.
    gate: RwLock<()>,
    /// Service statistics.
    stats: RwLock<ServiceStats>,
}

impl<S: RecoveryStore, C: LogicalClock, E: EventSink> GuardianRecoveryService<S, C, E> {
    /// Create a new recovery service.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` fails validation.
    pub fn new(
        store: Arc<S>,
        clock: Arc<C>,
        events: Arc<E>,
        config: RecoveryConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            administrator = %config.administrator,
            timeout_ticks = config.request_timeout_ticks,
            policy = ?config.threshold_policy,
            "Guardian recovery service initialized"
        );
        Ok(Self {
            config,
            store,
            clock,
            events,
            gate: RwLock::new(()),
            stats: RwLock::new(ServiceStats::default()),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Underlying clock.
    pub fn clock(&self) -> &Arc<C> {
        &self.clock
    }

    /// Underlying event sink.
    pub fn events(&self) -> &Arc<E> {
        &self.events
    }

    /// Current service statistics.
    pub fn stats(&self) -> ServiceStats {
        self.stats.read().clone()
    }

    /// Run one transaction: validate via `plan`, then commit and publish.
    fn transact<T>(
        &self,
        operation: &'static str,
        plan: impl FnOnce(Tick) -> Result<Transition<T>, RecoveryError>,
    ) -> Result<T, RecoveryError> {
        let _tx = self.gate.write();
        let now = self.clock.now();

        let Transition {
            output,
            batch,
            events,
        } = match plan(now) {
            Ok(transition) => transition,
            Err(err) => {
                if err.is_caller_error() {
                    warn!(operation, now, error = %err, "Operation rejected");
                } else {
                    error!(operation, now, error = %err, "Operation failed");
                }
                self.stats.write().rejected_operations += 1;
                return Err(err);
            }
        };

        debug!(operation, now, writes = batch.len(), "Committing batch");
        if let Err(err) = self.store.commit(batch) {
            error!(operation, error = %err, "Commit failed");
            self.stats.write().rejected_operations += 1;
            return Err(err.into());
        }

        {
            let mut stats = self.stats.write();
            stats.transactions_committed += 1;
            for event in &events {
                stats.record_event(event);
            }
        }

        for event in events {
            info!(operation, topic = event.topic(), now, "Transaction committed");
            self.events.publish(event);
        }

        Ok(output)
    }

    /// Abort with an internal error if a request about to be written is malformed.
    fn ensure_request_invariants(&self, request: &RecoveryRequest) -> Result<(), RecoveryError> {
        match check_request_invariants(request) {
            InvariantCheckResult::Valid => Ok(()),
            InvariantCheckResult::Invalid(violations) => {
                let detail = violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                error!(violations = %detail, "Request invariant violated");
                Err(RecoveryError::Internal(format!(
                    "request invariant violated: {detail}"
                )))
            }
        }
    }

    fn load_request(&self, request_id: &RequestId) -> Result<RecoveryRequest, RecoveryError> {
        self.store
            .get_request(request_id)?
            .ok_or(RecoveryError::RequestNotFound(*request_id))
    }

    fn load_record(&self, record_id: &RecordId) -> Result<Record, RecoveryError> {
        self.store
            .get_record(record_id)?
            .ok_or(RecoveryError::RecordNotFound(*record_id))
    }

    /// Shared body of pause / reactivate.
    fn set_active(
        &self,
        operation: &'static str,
        caller: Principal,
        record_id: RecordId,
        active: bool,
    ) -> Result<(), RecoveryError> {
        self.transact(operation, |now| {
            if caller != self.config.administrator {
                return Err(RecoveryError::NotAuthorized(caller));
            }

            let mut record = self.load_record(&record_id)?;
            record.active = active;

            let mut batch = WriteBatch::new();
            batch.put_record(record_id, record);

            let event = if active {
                RecoveryEvent::RecordReactivated { record_id, at: now }
            } else {
                RecoveryEvent::RecordPaused { record_id, at: now }
            };
            Ok(Transition::new((), batch, event))
        })
    }
}

impl<S: RecoveryStore, C: LogicalClock, E: EventSink> GuardianRecoveryApi
    for GuardianRecoveryService<S, C, E>
{
    #[instrument(skip(self, metadata, guardians), fields(caller = %caller, record_id = %record_id))]
    fn register_record(
        &self,
        caller: Principal,
        record_id: RecordId,
        metadata: EncryptedMetadata,
        guardians: Vec<Principal>,
        threshold: u8,
    ) -> Result<RecordId, RecoveryError> {
        self.transact("register_record", |now| {
            validate_guardian_config(&guardians, threshold, &self.config.guardian_bounds())?;

            if metadata.len() > self.config.max_metadata_len {
                return Err(RecoveryError::MetadataTooLarge {
                    size: metadata.len(),
                    max: self.config.max_metadata_len,
                });
            }

            let overwritten = self.store.record_exists(&record_id)?;
            if overwritten {
                if self.config.reject_record_overwrite {
                    return Err(RecoveryError::RecordAlreadyExists(record_id));
                }
                warn!(record = %record_id, "Overwriting existing record");
            }

            let event = RecoveryEvent::RecordRegistered {
                record_id,
                owner: caller,
                guardians: guardians.len(),
                threshold,
                overwritten,
                at: now,
            };

            let mut batch = WriteBatch::new();
            batch.put_record(
                record_id,
                Record::new(caller, metadata, guardians, threshold, now),
            );
            Ok(Transition::new(record_id, batch, event))
        })
    }

    fn get_record(&self, record_id: &RecordId) -> Result<Option<Record>, RecoveryError> {
        let _tx = self.gate.read();
        Ok(self.store.get_record(record_id)?)
    }

    #[instrument(skip(self, guardians), fields(caller = %caller))]
    fn set_guardians(
        &self,
        caller: Principal,
        guardians: Vec<Principal>,
        threshold: u8,
    ) -> Result<(), RecoveryError> {
        self.transact("set_guardians", |now| {
            validate_guardian_config(&guardians, threshold, &self.config.guardian_bounds())?;

            let event = RecoveryEvent::GuardiansConfigured {
                principal: caller,
                guardians: guardians.len(),
                threshold,
                at: now,
            };

            let mut batch = WriteBatch::new();
            batch.put_guardian_profile(
                caller,
                GuardianProfile {
                    guardians,
                    threshold,
                    updated_at: now,
                },
            );
            Ok(Transition::new((), batch, event))
        })
    }

    fn get_guardian_profile(
        &self,
        principal: &Principal,
    ) -> Result<Option<GuardianProfile>, RecoveryError> {
        let _tx = self.gate.read();
        Ok(self.store.get_guardian_profile(principal)?)
    }

    #[instrument(skip(self), fields(caller = %caller, record_id = %record_id, new_owner = %new_owner))]
    fn initiate_recovery(
        &self,
        caller: Principal,
        record_id: RecordId,
        new_owner: Principal,
    ) -> Result<RequestId, RecoveryError> {
        self.transact("initiate_recovery", |now| {
            let record = self.load_record(&record_id)?;
            if !record.active {
                return Err(RecoveryError::RecordInactive(record_id));
            }

            let nonce = self.store.request_nonce()?;
            let next_nonce = nonce
                .checked_add(1)
                .ok_or_else(|| RecoveryError::Internal("request counter exhausted".to_string()))?;
            let request_id = derive_request_id(nonce, now);
            if self.store.get_request(&request_id)?.is_some() {
                return Err(RecoveryError::Internal(format!(
                    "request id collision: {request_id}"
                )));
            }

            let request = RecoveryRequest::new(
                record_id,
                caller,
                new_owner,
                record.threshold,
                now,
                self.config.request_timeout_ticks,
            );
            self.ensure_request_invariants(&request)?;

            let event = RecoveryEvent::RecoveryInitiated {
                request_id,
                record_id,
                requester: caller,
                new_owner,
                expires_at: request.expires_at,
            };

            let mut batch = WriteBatch::new();
            batch
                .set_request_nonce(next_nonce)
                .put_request(request_id, request);
            Ok(Transition::new(request_id, batch, event))
        })
    }

    #[instrument(skip(self), fields(caller = %caller, request_id = %request_id))]
    fn endorse_recovery(
        &self,
        caller: Principal,
        request_id: RequestId,
    ) -> Result<u8, RecoveryError> {
        self.transact("endorse_recovery", |now| {
            let request = self.load_request(&request_id)?;
            if request.is_expired(now) {
                return Err(RecoveryError::RequestExpired {
                    expires_at: request.expires_at,
                    now,
                });
            }
            if request.completed {
                return Err(RecoveryError::AlreadyCompleted(request_id));
            }

            let record = self.load_record(&request.record_id)?;
            if !record.is_guardian(&caller) {
                return Err(RecoveryError::NotAGuardian(caller));
            }

            if self.store.has_endorsement(&request_id, &caller)? || request.has_endorser(&caller) {
                return Err(RecoveryError::DuplicateEndorsement {
                    request: request_id,
                    guardian: caller,
                });
            }

            if request.endorsers.len() >= limits::MAX_ENDORSEMENTS {
                return Err(RecoveryError::CapacityExceeded {
                    max: limits::MAX_ENDORSEMENTS,
                });
            }

            let updated = request.with_endorsement(caller);
            self.ensure_request_invariants(&updated)?;
            let count = updated.endorsement_count;

            let mut batch = WriteBatch::new();
            batch
                .put_endorsement(request_id, caller, Endorsement::verified_at(now))
                .put_request(request_id, updated);

            let event = RecoveryEvent::RecoveryEndorsed {
                request_id,
                guardian: caller,
                count,
                at: now,
            };
            Ok(Transition::new(count, batch, event))
        })
    }

    #[instrument(skip(self), fields(caller = %caller, request_id = %request_id))]
    fn complete_recovery(
        &self,
        caller: Principal,
        request_id: RequestId,
    ) -> Result<Principal, RecoveryError> {
        self.transact("complete_recovery", |now| {
            let request = self.load_request(&request_id)?;
            let record = self.load_record(&request.record_id)?;

            if request.is_expired(now) {
                return Err(RecoveryError::RequestExpired {
                    expires_at: request.expires_at,
                    now,
                });
            }
            if request.completed {
                return Err(RecoveryError::AlreadyCompleted(request_id));
            }

            let required = required_threshold(&request, &record, self.config.threshold_policy);
            if request.endorsement_count < required {
                return Err(RecoveryError::InsufficientEndorsements {
                    collected: request.endorsement_count,
                    required,
                });
            }

            let completed = request.completed();
            if !check_completion_threshold_invariant(&completed, required) {
                return Err(RecoveryError::Internal(
                    "completion threshold invariant violated".to_string(),
                ));
            }
            self.ensure_request_invariants(&completed)?;

            let new_owner = completed.new_owner;
            let record_id = completed.record_id;
            let event = RecoveryEvent::RecoveryCompleted {
                request_id,
                record_id,
                previous_owner: record.owner,
                new_owner,
                at: now,
            };

            let mut transferred = record;
            transferred.owner = new_owner;

            let mut batch = WriteBatch::new();
            batch
                .put_record(record_id, transferred)
                .put_request(request_id, completed);
            Ok(Transition::new(new_owner, batch, event))
        })
    }

    fn get_request(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<RecoveryRequest>, RecoveryError> {
        let _tx = self.gate.read();
        Ok(self.store.get_request(request_id)?)
    }

    fn get_status(&self, request_id: &RequestId) -> Result<Option<RecoveryStatus>, RecoveryError> {
        let _tx = self.gate.read();
        let now = self.clock.now();

        let Some(request) = self.store.get_request(request_id)? else {
            return Ok(None);
        };
        let Some(record) = self.store.get_record(&request.record_id)? else {
            return Ok(None);
        };

        let required = required_threshold(&request, &record, self.config.threshold_policy);
        Ok(Some(recovery_status(&request, required, now)))
    }

    fn has_endorsed(
        &self,
        request_id: &RequestId,
        guardian: &Principal,
    ) -> Result<bool, RecoveryError> {
        let _tx = self.gate.read();
        Ok(self.store.has_endorsement(request_id, guardian)?)
    }

    fn get_endorsement(
        &self,
        request_id: &RequestId,
        guardian: &Principal,
    ) -> Result<Option<Endorsement>, RecoveryError> {
        let _tx = self.gate.read();
        Ok(self.store.get_endorsement(request_id, guardian)?)
    }

    #[instrument(skip(self), fields(caller = %caller, record_id = %record_id))]
    fn pause_record(&self, caller: Principal, record_id: RecordId) -> Result<(), RecoveryError> {
        self.set_active("pause_record", caller, record_id, false)
    }

    #[instrument(skip(self), fields(caller = %caller, record_id = %record_id))]
    fn reactivate_record(
        &self,
        caller: Principal,
        record_id: RecordId,
    ) -> Result<(), RecoveryError> {
        self.set_active("reactivate_record", caller, record_id, true)
    }
}

// =============================================================================
// IN-MEMORY WIRING
// =============================================================================

/// Service over the in-memory adapters.
pub type InMemoryRecoveryService =
    GuardianRecoveryService<InMemoryRecoveryStore, ManualClock, InMemoryEventLog>;

/// Build a service over fresh in-memory adapters, clock starting at `start`.
///
/// # Errors
///
/// Returns `ConfigError` if `config` fails validation.
pub fn create_in_memory_service(
    config: RecoveryConfig,
    start: Tick,
) -> Result<InMemoryRecoveryService, ConfigError> {
    GuardianRecoveryService::new(
        Arc::new(InMemoryRecoveryStore::new()),
        Arc::new(ManualClock::new(start)),
        Arc::new(InMemoryEventLog::new()),
        config,
    )
}

/// Create a service for testing, administered by `[0xAD; 20]`.
#[must_use]
pub fn create_test_service() -> InMemoryRecoveryService {
    GuardianRecoveryService {
        config: RecoveryConfig::with_administrator(Principal::new([0xAD; 20])),
        store: Arc::new(InMemoryRecoveryStore::new()),
        clock: Arc::new(ManualClock::new(0)),
        events: Arc::new(InMemoryEventLog::new()),
        gate: RwLock::new(()),
        stats: RwLock::new(ServiceStats::default()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
