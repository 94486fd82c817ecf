//! # Ledger Properties
//!
//! Randomized endorsement sequences. Whatever the order, repetition or
//! timing of guardian calls:
//!
//! - each guardian is counted at most once
//! - the stored count equals the endorser list length
//! - completion succeeds exactly when the distinct count reaches the threshold
//!   before the deadline

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use guardian_recovery::prelude::*;
    use proptest::prelude::*;
    use rand::seq::SliceRandom;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_endorsements_counted_once(
            n in 3u8..=10,
            threshold_offset in 0u8..9,
            calls in proptest::collection::vec((1u8..=12, 0u64..20), 0..40),
        ) {
            let m = 2 + threshold_offset % (n - 1);
            let service = service();
            register(&service, n, m);
            let request = service.initiate_recovery(REQUESTER, RECORD, NEW_OWNER).unwrap();

            let mut accepted = HashSet::new();
            for (who, delay) in calls {
                service.clock().advance(delay);
                let expired = service.clock().now() >= 144;
                let result = service.endorse_recovery(guardian(who), request);

                let should_accept = !expired && who <= n && !accepted.contains(&who);
                prop_assert_eq!(result.is_ok(), should_accept);
                if should_accept {
                    accepted.insert(who);
                    prop_assert_eq!(result.unwrap() as usize, accepted.len());
                }
            }

            let stored = service.get_request(&request).unwrap().unwrap();
            prop_assert_eq!(usize::from(stored.endorsement_count), accepted.len());
            prop_assert!(check_request_invariants(&stored).is_valid());

            let expired = service.clock().now() >= 144;
            let completes = service.complete_recovery(REQUESTER, request).is_ok();
            prop_assert_eq!(completes, !expired && accepted.len() >= usize::from(m));

            let owner = service.get_record(&RECORD).unwrap().unwrap().owner;
            prop_assert_eq!(owner == NEW_OWNER, completes);
        }

        #[test]
        fn prop_failed_operations_change_nothing(who in 1u8..=20, tick in 0u64..300) {
            let service = service();
            register(&service, 3, 2);
            let request = service.initiate_recovery(REQUESTER, RECORD, NEW_OWNER).unwrap();
            service.clock().advance_to(tick);

            let before = service.store().snapshot().unwrap();
            if service.endorse_recovery(guardian(who), request).is_err() {
                prop_assert_eq!(service.store().snapshot().unwrap(), before);
            }
        }
    }

    #[test]
    fn test_shuffled_endorsement_orders_agree() {
        let mut rng = StdRng::seed_from_u64(0x6A5D);

        for _ in 0..25 {
            let mut order: Vec<u8> = (1..=7).chain(1..=7).collect();
            order.shuffle(&mut rng);

            let service = service();
            register(&service, 7, 5);
            let request = service.initiate_recovery(REQUESTER, RECORD, NEW_OWNER).unwrap();
            for who in &order {
                let _ = service.endorse_recovery(guardian(*who), request);
            }

            let stored = service.get_request(&request).unwrap().unwrap();
            assert_eq!(stored.endorsement_count, 7);

            // endorsers kept in first-call order
            let mut first_seen = Vec::new();
            for who in order {
                if !first_seen.contains(&guardian(who)) {
                    first_seen.push(guardian(who));
                }
            }
            assert_eq!(stored.endorsers, first_seen);
            assert!(service.complete_recovery(OUTSIDER, request).is_ok());
        }
    }
}
