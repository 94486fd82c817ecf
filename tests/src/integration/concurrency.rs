//! # Concurrent Callers
//!
//! Many threads hitting one service. Transactions are serialized, so the
//! outcome must equal some sequential ordering of the same calls.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use guardian_recovery::prelude::*;
    use std::thread;

    #[test]
    fn test_parallel_endorsements_all_counted_once() {
        let service = service();
        register(&service, 10, 7);
        let request = service.initiate_recovery(REQUESTER, RECORD, NEW_OWNER).unwrap();

        // every guardian tries twice, from two threads
        let results: Vec<Result<u8, RecoveryError>> = thread::scope(|s| {
            let handles: Vec<_> = (1..=10u8)
                .flat_map(|i| [i, i])
                .map(|i| {
                    let service = &service;
                    s.spawn(move || service.endorse_recovery(guardian(i), request))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect()
        });

        let accepted = results.iter().filter(|r| r.is_ok()).count();
        let duplicates = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.kind() == ErrorKind::DuplicateEndorsement))
            .count();
        assert_eq!(accepted, 10);
        assert_eq!(duplicates, 10);

        // counts returned are a permutation of 1..=10
        let mut counts: Vec<u8> = results.into_iter().filter_map(Result::ok).collect();
        counts.sort_unstable();
        assert_eq!(counts, (1..=10).collect::<Vec<u8>>());

        let stored = service.get_request(&request).unwrap().unwrap();
        assert_eq!(stored.endorsement_count, 10);
        assert!(check_request_invariants(&stored).is_valid());
    }

    #[test]
    fn test_racing_completions_transfer_once() {
        let service = service();
        register(&service, 3, 2);
        let request = service.initiate_recovery(REQUESTER, RECORD, NEW_OWNER).unwrap();
        service.endorse_recovery(guardian(1), request).unwrap();
        service.endorse_recovery(guardian(2), request).unwrap();

        let outcomes: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let service = &service;
                    s.spawn(move || service.complete_recovery(REQUESTER, request))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect()
        });

        let wins = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert!(outcomes
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == RecoveryError::AlreadyCompleted(request)));
        assert_eq!(service.stats().recoveries_completed, 1);
    }

    #[test]
    fn test_parallel_initiations_get_distinct_ids() {
        let service = service();
        register(&service, 3, 2);

        let ids: Vec<RequestId> = thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    let service = &service;
                    s.spawn(move || service.initiate_recovery(REQUESTER, RECORD, NEW_OWNER))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });

        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 16);
        assert_eq!(service.store().request_nonce().unwrap(), 16);
    }
}
