//! Timestamp-ordered reconciliation between local and remote item sets.
//!
//! This is a deliberate last-writer-wins strategy, not a CRDT or vector-clock
//! scheme. Concurrent edits landing on the exact same timestamp keep the
//! local copy; the domain assumes a single writer per record, so that loss
//! window is accepted.
//!
//! # Algorithm
//!
//! 1. Start from the local item set
//! 2. For each remote item, find the local match by the category's identity
//!    field
//! 3. Replace local with remote only when `remote.timestamp > local.timestamp`
//! 4. Remote items with no local match are appended as new
//! 5. Sort the result descending by timestamp - except for singleton
//!    categories, which keep local-first order because only the head record
//!    is persisted

use crate::{Category, Record};

/// Merge a remote snapshot into a local one, last-writer-wins by timestamp.
///
/// Every identity from either input survives exactly once; remote records
/// without an identity value can never match and are always appended.
///
/// List categories come back sorted newest-first. Singleton categories keep
/// the local record in front instead: their persistence collapses to the
/// head record, and an unrelated remote singleton must not displace the
/// local one there.
pub fn merge(category: Category, local: Vec<Record>, remote: Vec<Record>) -> Vec<Record> {
    let mut merged = local;

    for remote_item in remote {
        match merged
            .iter_mut()
            .find(|local_item| local_item.same_identity(&remote_item, category))
        {
            Some(local_item) => {
                // Ties keep local
                if remote_item.timestamp() > local_item.timestamp() {
                    *local_item = remote_item;
                }
            }
            None => merged.push(remote_item),
        }
    }

    if !category.is_singleton() {
        merged.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records_from_value;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<Record> {
        records_from_value(value)
    }

    #[test]
    fn newer_remote_replaces_local() {
        let local = records(json!([{"id": "o1", "status": "open", "timestamp": 150}]));
        let remote = records(json!([{"id": "o1", "status": "paid", "timestamp": 200}]));

        let merged = merge(Category::Orders, local, remote);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].get("status"), Some(&json!("paid")));
    }

    #[test]
    fn older_remote_keeps_local_unchanged() {
        let local = records(json!([{"id": "o1", "status": "open", "timestamp": 200}]));
        let remote = records(json!([{"id": "o1", "status": "stale", "timestamp": 150}]));

        let merged = merge(Category::Orders, local, remote);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].get("status"), Some(&json!("open")));
        assert_eq!(merged[0].timestamp(), 200);
    }

    #[test]
    fn timestamp_tie_keeps_local() {
        let local = records(json!([{"id": "p1", "price": 10, "timestamp": 100}]));
        let remote = records(json!([{"id": "p1", "price": 99, "timestamp": 100}]));

        let merged = merge(Category::Products, local, remote);

        assert_eq!(merged[0].get("price"), Some(&json!(10)));
    }

    #[test]
    fn unmatched_remote_is_appended() {
        let local = records(json!([{"id": "p1", "timestamp": 100}]));
        let remote = records(json!([{"id": "p2", "timestamp": 50}]));

        let merged = merge(Category::Products, local, remote);

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn config_matches_by_company_name() {
        // A remote config for a different company must not overwrite the
        // local singleton; it is appended instead.
        let local = records(json!({"company": "B-One", "currency": "HTG", "timestamp": 100}));
        let remote = records(json!({"company": "Other", "currency": "USD", "timestamp": 500}));

        let merged = merge(Category::Config, local, remote);

        assert_eq!(merged.len(), 2);
        let local_kept = merged
            .iter()
            .find(|r| r.get("company") == Some(&json!("B-One")))
            .unwrap();
        assert_eq!(local_kept.get("currency"), Some(&json!("HTG")));
    }

    #[test]
    fn config_keeps_local_singleton_in_front() {
        // The appended remote config must not end up at the head, or it
        // would win when the singleton collapses to one persisted object.
        let local = records(json!({"company": "B-One", "currency": "HTG", "timestamp": 100}));
        let remote = records(json!({"company": "Other", "currency": "USD", "timestamp": 500}));

        let merged = merge(Category::Config, local, remote);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].get("company"), Some(&json!("B-One")));
    }

    #[test]
    fn users_match_by_username() {
        let local = records(json!([{"username": "amara", "role": "admin", "timestamp": 100}]));
        let remote = records(json!([{"username": "amara", "role": "cashier", "timestamp": 300}]));

        let merged = merge(Category::Users, local, remote);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].get("role"), Some(&json!("cashier")));
    }

    #[test]
    fn result_sorted_descending_by_timestamp() {
        let local = records(json!([
            {"id": "a", "timestamp": 100},
            {"id": "b", "timestamp": 400},
        ]));
        let remote = records(json!([
            {"id": "c", "timestamp": 250},
            {"id": "d", "timestamp": 50},
        ]));

        let merged = merge(Category::Products, local, remote);

        let stamps: Vec<_> = merged.iter().map(Record::timestamp).collect();
        assert_eq!(stamps, [400, 250, 100, 50]);
    }

    #[test]
    fn identityless_records_are_kept() {
        let local = records(json!([{"note": "cash drawer", "timestamp": 100}]));
        let remote = records(json!([{"note": "cash drawer", "timestamp": 900}]));

        // Neither side carries an `id`, so nothing can match; both survive.
        let merged = merge(Category::Finance, local, remote);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn empty_inputs() {
        assert!(merge(Category::Orders, vec![], vec![]).is_empty());

        let remote = records(json!([{"id": "o1", "timestamp": 10}]));
        let merged = merge(Category::Orders, vec![], remote);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn push_pull_roundtrip_is_stable() {
        // Pushing a snapshot and pulling it straight back must merge to the
        // original, modulo sort order.
        let snapshot = records(json!([
            {"id": "p1", "name": "rice", "timestamp": 300},
            {"id": "p2", "name": "oil", "timestamp": 100},
        ]));

        let merged = merge(Category::Products, snapshot.clone(), snapshot.clone());

        assert_eq!(merged.len(), snapshot.len());
        for original in &snapshot {
            assert!(merged.contains(original));
        }
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::BTreeMap;

        fn side(ids: &BTreeMap<u8, u64>) -> Vec<Record> {
            ids.iter()
                .map(|(id, ts)| {
                    Record::try_from(json!({"id": id.to_string(), "timestamp": ts})).unwrap()
                })
                .collect()
        }

        proptest! {
            #[test]
            fn prop_every_identity_survives_once(
                local_ids in proptest::collection::btree_map(0u8..12, 1u64..1000, 0..8),
                remote_ids in proptest::collection::btree_map(0u8..12, 1u64..1000, 0..8),
            ) {
                let merged = merge(Category::Products, side(&local_ids), side(&remote_ids));

                let mut union: Vec<u8> = local_ids.keys().chain(remote_ids.keys()).copied().collect();
                union.sort_unstable();
                union.dedup();

                prop_assert_eq!(merged.len(), union.len());

                for id in union {
                    let expected = match (local_ids.get(&id), remote_ids.get(&id)) {
                        (Some(l), Some(r)) if *r > *l => *r,
                        (Some(l), _) => *l,
                        (None, Some(r)) => *r,
                        (None, None) => unreachable!(),
                    };

                    let winner = merged
                        .iter()
                        .find(|rec| rec.get("id") == Some(&json!(id.to_string())))
                        .unwrap();
                    prop_assert_eq!(winner.timestamp(), expected);
                }
            }

            #[test]
            fn prop_output_sorted_descending(
                local_ids in proptest::collection::btree_map(0u8..12, 1u64..1000, 0..8),
                remote_ids in proptest::collection::btree_map(0u8..12, 1u64..1000, 0..8),
            ) {
                let merged = merge(Category::Products, side(&local_ids), side(&remote_ids));
                let stamps: Vec<_> = merged.iter().map(Record::timestamp).collect();
                let mut sorted = stamps.clone();
                sorted.sort_unstable_by(|a, b| b.cmp(a));
                prop_assert_eq!(stamps, sorted);
            }
        }
    }
}
