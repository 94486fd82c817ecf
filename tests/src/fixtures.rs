//! Shared identities and ledger setup for the suite.

use guardian_recovery::prelude::*;
use std::sync::Arc;

/// Administrator used by every fixture service.
pub const ADMIN: Principal = Principal::new([0xAD; 20]);
/// Original record owner.
pub const OWNER: Principal = Principal::new([0x01; 20]);
/// Recovery target.
pub const NEW_OWNER: Principal = Principal::new([0x02; 20]);
/// Third party that opens requests.
pub const REQUESTER: Principal = Principal::new([0x03; 20]);
/// Principal with no role anywhere.
pub const OUTSIDER: Principal = Principal::new([0x0F; 20]);
/// Default record under test.
pub const RECORD: RecordId = RecordId::new([0xAA; 32]);

/// Guardian `i` (1-based) of a fixture list.
pub fn guardian(i: u8) -> Principal {
    Principal::new([0x10 + i; 20])
}

/// `n` distinct guardians.
pub fn guardians(n: u8) -> Vec<Principal> {
    (1..=n).map(guardian).collect()
}

/// Fresh in-memory service administered by [`ADMIN`], clock at 0.
pub fn service() -> InMemoryRecoveryService {
    service_with(RecoveryConfig::with_administrator(ADMIN))
}

/// Fresh in-memory service with a custom configuration.
pub fn service_with(config: RecoveryConfig) -> InMemoryRecoveryService {
    match create_in_memory_service(config, 0) {
        Ok(service) => service,
        Err(err) => panic!("fixture config rejected: {err}"),
    }
}

/// Service restored from a snapshot, clock at `now`.
pub fn restored_service(snapshot: LedgerSnapshot, now: Tick) -> InMemoryRecoveryService {
    match try_restore(snapshot, now) {
        Ok(service) => service,
        Err(err) => panic!("fixture snapshot rejected: {err}"),
    }
}

/// Restore under the fixture configuration, surfacing snapshot rejection.
pub fn try_restore(snapshot: LedgerSnapshot, now: Tick) -> Result<InMemoryRecoveryService, StoreError> {
    let config = RecoveryConfig::with_administrator(ADMIN);
    let store = InMemoryRecoveryStore::from_snapshot(snapshot, &config)?;
    let service = GuardianRecoveryService::new(
        Arc::new(store),
        Arc::new(ManualClock::new(now)),
        Arc::new(InMemoryEventLog::new()),
        config,
    );
    match service {
        Ok(service) => Ok(service),
        Err(err) => panic!("fixture config rejected: {err}"),
    }
}

/// Register [`RECORD`] for [`OWNER`] with `n` guardians and threshold `m`.
pub fn register(service: &impl GuardianRecoveryApi, n: u8, m: u8) {
    if let Err(err) = service.register_record(OWNER, RECORD, vec![0xC0u8, 0xDE].into(), guardians(n), m) {
        panic!("fixture registration failed: {err}");
    }
}
