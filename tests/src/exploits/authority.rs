//! # Authority Abuse
//!
//! Callers acting outside their role: non-guardians endorsing, guardians of
//! one record endorsing another, non-administrators pausing records.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use guardian_recovery::prelude::*;

    const OTHER_RECORD: RecordId = RecordId::new([0xBB; 32]);

    #[test]
    fn test_owner_and_requester_are_not_guardians() {
        let service = service();
        register(&service, 3, 2);
        let request = service.initiate_recovery(REQUESTER, RECORD, NEW_OWNER).unwrap();

        for caller in [OWNER, REQUESTER, NEW_OWNER, OUTSIDER, ADMIN] {
            let err = service.endorse_recovery(caller, request).unwrap_err();
            assert_eq!(err, RecoveryError::NotAGuardian(caller));
        }
        assert_eq!(service.get_status(&request).unwrap().unwrap().collected, 0);
    }

    #[test]
    fn test_guardian_of_another_record_rejected() {
        let service = service();
        register(&service, 3, 2);
        let outsiders: Vec<_> = (0x40..0x43).map(|b| Principal::new([b; 20])).collect();
        service
            .register_record(OWNER, OTHER_RECORD, Default::default(), outsiders.clone(), 2)
            .unwrap();

        let request = service.initiate_recovery(REQUESTER, RECORD, NEW_OWNER).unwrap();
        let err = service.endorse_recovery(outsiders[0], request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);
    }

    #[test]
    fn test_guardian_profile_grants_no_endorsement_rights() {
        let service = service();
        register(&service, 3, 2);
        let profile_guardians: Vec<_> = (0x50..0x53).map(|b| Principal::new([b; 20])).collect();
        service
            .set_guardians(OWNER, profile_guardians.clone(), 2)
            .unwrap();

        let request = service.initiate_recovery(REQUESTER, RECORD, NEW_OWNER).unwrap();
        assert!(service.endorse_recovery(profile_guardians[0], request).is_err());
    }

    #[test]
    fn test_only_administrator_toggles_records() {
        let service = service();
        register(&service, 3, 2);

        for caller in [OWNER, guardian(1), OUTSIDER] {
            assert_eq!(
                service.pause_record(caller, RECORD).unwrap_err(),
                RecoveryError::NotAuthorized(caller)
            );
            assert_eq!(
                service.reactivate_record(caller, RECORD).unwrap_err(),
                RecoveryError::NotAuthorized(caller)
            );
        }
        assert!(service.get_record(&RECORD).unwrap().unwrap().active);
        assert!(service.events().events().iter().all(|e| !matches!(
            e,
            RecoveryEvent::RecordPaused { .. } | RecoveryEvent::RecordReactivated { .. }
        )));
    }

    #[test]
    fn test_zero_administrator_is_only_default() {
        // default config leaves the zero principal as administrator
        let service = service_with(RecoveryConfig::default());
        register(&service, 3, 2);
        assert!(service.pause_record(ADMIN, RECORD).is_err());
        assert!(service.pause_record(Principal::ZERO, RECORD).is_ok());
        assert!(service.config().validate_for_production().is_err());
    }

    #[test]
    fn test_overwrite_guard_blocks_hijack() {
        let config = RecoveryConfig {
            reject_record_overwrite: true,
            ..RecoveryConfig::with_administrator(ADMIN)
        };
        let service = service_with(config);
        register(&service, 3, 2);

        let hijack = (0x70..0x73).map(|b| Principal::new([b; 20])).collect();
        let err = service
            .register_record(OUTSIDER, RECORD, Default::default(), hijack, 2)
            .unwrap_err();
        assert_eq!(err, RecoveryError::RecordAlreadyExists(RECORD));
        assert_eq!(service.get_record(&RECORD).unwrap().unwrap().owner, OWNER);
    }
}
