//! Property tests for the query surface of the contract layer.

#![allow(clippy::expect_used, missing_docs)]

use attest_contract::{Contracts, DeploymentConfig};
use attest_ledger::{MemoryLedger, TransientMap};
use proptest::prelude::*;
use std::collections::BTreeSet;

const ISSUER: &str = "UniversityOrg";

fn setup(ids: &BTreeSet<String>) -> (MemoryLedger, Contracts) {
    let config = DeploymentConfig::default_profile(ISSUER, "CompanyOrg", "StudentOrg");
    let contracts = Contracts::new(config);
    let ledger = MemoryLedger::new();
    for id in ids {
        ledger
            .execute(ISSUER, TransientMap::new(), |tx| {
                contracts
                    .results()
                    .create(tx, id, "S1", "100", "82", "82", "Pass")
            })
            .expect("seed create commits");
    }
    (ledger, contracts)
}

proptest! {
    #[test]
    fn pagination_agrees_with_the_unpaginated_query(
        ids in proptest::collection::btree_set("[a-f]{1,4}", 1..15),
        page_size in 1u32..5,
    ) {
        let (ledger, contracts) = setup(&ids);

        let all: Vec<String> = ledger
            .execute(ISSUER, TransientMap::new(), |tx| contracts.results().get_all(tx))
            .expect("query succeeds")
            .into_iter()
            .map(|record| record.id)
            .collect();

        let mut paged = Vec::new();
        let mut bookmark = String::new();
        loop {
            let window = ledger
                .execute(ISSUER, TransientMap::new(), |tx| {
                    contracts
                        .results()
                        .get_with_pagination(tx, page_size, &bookmark)
                })
                .expect("paginated query succeeds");
            prop_assert!(window.records.len() as u32 <= page_size);
            prop_assert_eq!(window.fetched_count as usize, window.records.len());
            paged.extend(window.records.into_iter().map(|record| record.id));
            if window.bookmark.is_empty() {
                break;
            }
            bookmark = window.bookmark;
        }

        prop_assert_eq!(paged, all);
    }

    #[test]
    fn range_scan_agrees_with_reference_filter(
        ids in proptest::collection::btree_set("[a-f]{1,4}", 0..15),
        start in "[a-f]{0,3}",
        end in "[a-f]{0,3}",
    ) {
        let (ledger, contracts) = setup(&ids);

        let scanned: Vec<String> = ledger
            .execute(ISSUER, TransientMap::new(), |tx| {
                contracts.results().get_by_range(tx, &start, &end)
            })
            .expect("range scan succeeds")
            .into_iter()
            .map(|record| record.id)
            .collect();

        let expected: Vec<String> = ids
            .iter()
            .filter(|id| start.is_empty() || id.as_str() >= start.as_str())
            .filter(|id| end.is_empty() || id.as_str() < end.as_str())
            .cloned()
            .collect();

        prop_assert_eq!(scanned, expected);
    }
}
