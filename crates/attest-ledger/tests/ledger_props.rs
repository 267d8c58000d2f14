//! Property tests for the in-memory ledger substrate.

#![allow(clippy::expect_used, missing_docs)]

use attest_ledger::{MemoryLedger, Selector, TransactionContext, TransientMap};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn populate(ledger: &MemoryLedger, entries: &BTreeMap<String, String>) {
    for (key, value) in entries {
        ledger
            .execute("Org1", TransientMap::new(), |tx| {
                tx.put_state(key, value.as_bytes().to_vec())
            })
            .expect("seed write commits");
    }
}

fn json_payload(key: &str) -> String {
    format!("{{\"assetType\":\"Thing\",\"id\":\"{key}\"}}")
}

proptest! {
    #[test]
    fn range_scan_matches_reference_filter(
        entries in proptest::collection::btree_map("[a-e]{1,3}", "[a-z]{0,4}", 0..20),
        start in "[a-e]{0,3}",
        end in "[a-e]{0,3}",
    ) {
        let ledger = MemoryLedger::new();
        populate(&ledger, &entries);

        let mut tx = ledger.begin("Org1", TransientMap::new());
        let scanned: Vec<(String, Vec<u8>)> = tx
            .get_state_by_range(&start, &end)
            .expect("range scan succeeds")
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect();

        let expected: Vec<(String, Vec<u8>)> = entries
            .iter()
            .filter(|(key, _)| start.is_empty() || key.as_str() >= start.as_str())
            .filter(|(key, _)| end.is_empty() || key.as_str() < end.as_str())
            .map(|(key, value)| (key.clone(), value.as_bytes().to_vec()))
            .collect();

        prop_assert_eq!(scanned, expected);
    }

    #[test]
    fn pagination_partitions_the_query_result(
        keys in proptest::collection::btree_set("[a-e]{1,4}", 1..20),
        page_size in 1u32..6,
    ) {
        let ledger = MemoryLedger::new();
        for key in &keys {
            ledger
                .execute("Org1", TransientMap::new(), |tx| {
                    tx.put_state(key, json_payload(key).into_bytes())
                })
                .expect("seed write commits");
        }

        let selector = Selector::new().field("assetType", "Thing");
        let mut tx = ledger.begin("Org1", TransientMap::new());

        let mut collected = Vec::new();
        let mut bookmark = String::new();
        loop {
            let page = tx
                .query_state_with_pagination(&selector, page_size, &bookmark)
                .expect("paginated query succeeds");
            prop_assert!(page.entries.len() as u32 <= page_size);
            prop_assert_eq!(page.fetched_count as usize, page.entries.len());
            collected.extend(page.entries.into_iter().map(|entry| entry.key));
            if page.bookmark.is_empty() {
                break;
            }
            bookmark = page.bookmark;
        }

        // Windows are non-overlapping and exhaustive, in ascending key order.
        let expected: Vec<String> = keys.iter().cloned().collect();
        prop_assert_eq!(collected, expected);
    }

    #[test]
    fn history_length_tracks_committed_writes(
        values in proptest::collection::vec("[a-z]{0,4}", 1..10),
    ) {
        let ledger = MemoryLedger::new();
        for value in &values {
            ledger
                .execute("Org1", TransientMap::new(), |tx| {
                    tx.put_state("k", value.as_bytes().to_vec())
                })
                .expect("seed write commits");
        }

        let mut tx = ledger.begin("Org1", TransientMap::new());
        let history = tx.history_for_key("k").expect("history succeeds");
        prop_assert_eq!(history.len(), values.len());
        // Newest first: the head is the last committed value.
        prop_assert_eq!(
            history[0].value.clone(),
            values.last().map(|value| value.as_bytes().to_vec())
        );
    }
}
