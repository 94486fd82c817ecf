//! # Snapshot Persistence
//!
//! A ledger saved mid-recovery and restored into a new service continues
//! exactly where it stopped: request ids, endorsements, the id counter and
//! deadlines all survive. A snapshot whose contents break the ledger rules
//! is refused instead of restored.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use guardian_recovery::prelude::*;

    fn half_endorsed() -> (InMemoryRecoveryService, RequestId) {
        let service = service();
        register(&service, 3, 2);
        service.clock().advance_to(20);
        let request = service.initiate_recovery(REQUESTER, RECORD, NEW_OWNER).unwrap();
        service.endorse_recovery(guardian(1), request).unwrap();
        (service, request)
    }

    #[test]
    fn test_json_restore_continues_recovery() {
        let (service, request) = half_endorsed();
        let json = service.store().snapshot().unwrap().to_json().unwrap();

        let restored = restored_service(LedgerSnapshot::from_json(&json).unwrap(), 30);
        assert!(restored.has_endorsed(&request, &guardian(1)).unwrap());

        let err = restored.endorse_recovery(guardian(1), request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateEndorsement);

        restored.endorse_recovery(guardian(2), request).unwrap();
        assert_eq!(restored.complete_recovery(REQUESTER, request).unwrap(), NEW_OWNER);
        assert_eq!(restored.get_record(&RECORD).unwrap().unwrap().owner, NEW_OWNER);
    }

    #[test]
    fn test_binary_restore_keeps_deadline() {
        let (service, request) = half_endorsed();
        let bytes = service.store().snapshot().unwrap().to_bytes().unwrap();

        let restored = restored_service(LedgerSnapshot::from_bytes(&bytes).unwrap(), 164);
        let status = restored.get_status(&request).unwrap().unwrap();
        assert_eq!(status.state, RequestState::Expired);
        assert_eq!(
            restored.endorse_recovery(guardian(2), request).unwrap_err(),
            RecoveryError::RequestExpired {
                expires_at: 164,
                now: 164
            }
        );
    }

    #[test]
    fn test_restored_counter_never_reuses_ids() {
        let (service, first) = half_endorsed();
        let snapshot = service.store().snapshot().unwrap();
        assert_eq!(snapshot.request_nonce, 1);

        // same tick as the original initiation
        let restored = restored_service(snapshot, 20);
        let second = restored.initiate_recovery(REQUESTER, RECORD, NEW_OWNER).unwrap();
        assert_ne!(first, second);
        assert_eq!(restored.store().request_count().unwrap(), 2);
    }

    #[test]
    fn test_equal_ledgers_snapshot_identically() {
        let (a, _) = half_endorsed();
        let (b, _) = half_endorsed();
        assert_eq!(
            a.store().snapshot().unwrap().to_json().unwrap(),
            b.store().snapshot().unwrap().to_json().unwrap()
        );
    }

    #[test]
    fn test_snapshot_json_shape() {
        let (service, request) = half_endorsed();
        let json = service.store().snapshot().unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], 1);
        assert_eq!(value["records"][0]["id"], RECORD.to_hex());
        assert_eq!(value["requests"][0]["id"], request.to_hex());
        assert_eq!(value["endorsements"][0]["guardian"], guardian(1).to_hex());
    }

    #[test]
    fn test_tampered_snapshot_refused() {
        let (service, request) = half_endorsed();
        let honest = service.store().snapshot().unwrap();

        // count claims two endorsements, list holds none
        let mut inflated = honest.clone();
        inflated.requests[0].request.endorsement_count = 2;
        inflated.requests[0].request.endorsers.clear();
        inflated.endorsements.clear();
        let err = try_restore(inflated, 30).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));

        // record cut down to one guardian with threshold 1
        let mut shrunk = honest.clone();
        shrunk.records[0].record.guardians.truncate(1);
        shrunk.records[0].record.threshold = 1;
        assert!(try_restore(shrunk, 30).is_err());

        // endorsement for a request that never existed
        let mut orphan = honest.clone();
        orphan.endorsements[0].request_id = RequestId::new([0x77; 32]);
        assert!(try_restore(orphan, 30).is_err());

        // untouched snapshot still restores and agrees with itself
        let restored = try_restore(honest, 30).unwrap();
        let status = restored.get_status(&request).unwrap().unwrap();
        assert!(!status.can_complete);
        assert_eq!(
            restored.complete_recovery(REQUESTER, request).unwrap_err().kind(),
            ErrorKind::InsufficientEndorsements
        );
    }

    #[test]
    fn test_tampered_json_refused() {
        let (service, _) = half_endorsed();
        let json = service.store().snapshot().unwrap().to_json().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["requests"][0]["request"]["expires_at"] = serde_json::json!(1_000_000);

        let snapshot = LedgerSnapshot::from_json(&value.to_string()).unwrap();
        let err = try_restore(snapshot, 30).unwrap_err();
        assert!(err.to_string().contains("deadline"));
    }
}
