use rstest::rstest;

use chq_node::DistributionRatio;
use chq_primitives::{EpochRange, Pagination};
use chq_query::NotExist;
use chq_storage::Store;

use crate::fixtures::{
    empty_store, hermes_protocol, hermes_protocol_with_sources, insert_distribution,
    insert_distribution_from, insert_ratio, SOURCE_ADDRESS
};




fn range() -> EpochRange {
    EpochRange::new(100, 5).unwrap()
}


fn page(offset: u64, size: u64) -> Pagination {
    Pagination::new(offset, size).unwrap()
}


#[test]
fn test_rewards_by_delegate() {
    let store = empty_store();
    insert_distribution(&store, 100, "hash1", "metanyx", "io1voter1", "500", 1000);
    insert_distribution(&store, 101, "hash2", "metanyx", "io1voter2", "700", 1010);
    insert_distribution(&store, 101, "hash3", "other", "io1voter3", "900", 1020);
    let hermes = hermes_protocol(store);

    let rewards = hermes.rewards_by_delegate(range(), page(0, 10), "metanyx").unwrap();

    // Newest first.
    assert_eq!(rewards.len(), 2);
    assert_eq!(rewards[0].voter_address, "io1voter2");
    assert_eq!(rewards[0].amount, "700");
    assert_eq!(rewards[0].action_hash, "hash2");
    assert_eq!(rewards[1].voter_address, "io1voter1");
}


#[test]
fn test_rewards_by_voter() {
    let store = empty_store();
    insert_distribution(&store, 100, "hash1", "metanyx", "io1voter1", "500", 1000);
    insert_distribution(&store, 102, "hash2", "chainshield", "io1voter1", "300", 1010);
    insert_distribution(&store, 102, "hash3", "chainshield", "io1voter2", "400", 1020);
    let hermes = hermes_protocol(store);

    let rewards = hermes.rewards_by_voter(range(), page(0, 10), "io1voter1").unwrap();

    assert_eq!(rewards.len(), 2);
    assert_eq!(rewards[0].delegate_name, "chainshield");
    assert_eq!(rewards[1].delegate_name, "metanyx");
}


#[test]
fn test_rewards_outside_epoch_range_are_invisible() {
    let store = empty_store();
    insert_distribution(&store, 99, "hash1", "metanyx", "io1voter1", "500", 1000);
    insert_distribution(&store, 105, "hash2", "metanyx", "io1voter2", "700", 1010);
    let hermes = hermes_protocol(store);

    let err = hermes.rewards_by_delegate(range(), page(0, 10), "metanyx").unwrap_err();
    assert!(err.chain().any(|cause| cause.is::<NotExist>()));
}


#[test]
fn test_rewards_from_untrusted_source_are_invisible() {
    let store = empty_store();
    insert_distribution_from(
        &store, 100, "hash1", "io1impostor", "metanyx", "io1voter1", "500", 1000
    );
    let hermes = hermes_protocol(store);

    let err = hermes.rewards_by_delegate(range(), page(0, 10), "metanyx").unwrap_err();
    assert!(err.chain().any(|cause| cause.is::<NotExist>()));
}


#[test]
fn test_empty_result_is_not_exist() {
    let hermes = hermes_protocol(empty_store());

    let err = hermes.rewards_by_delegate(range(), page(0, 10), "metanyx").unwrap_err();
    assert!(err.chain().any(|cause| cause.is::<NotExist>()));
}


#[rstest]
#[case(0, 10)]
#[case(10, 10)]
#[case(20, 5)]
fn test_pagination_pages_are_contiguous(#[case] offset: u64, #[case] expected: usize) {
    let store = empty_store();
    for i in 0..25u64 {
        insert_distribution(
            &store,
            100,
            &format!("hash{:02}", i),
            "metanyx",
            &format!("io1voter{:02}", i),
            "100",
            2000 + i
        );
    }
    let hermes = hermes_protocol(store);

    let rewards = hermes.rewards_by_delegate(range(), page(offset, 10), "metanyx").unwrap();

    assert_eq!(rewards.len(), expected);
    // Descending by timestamp: the page starting at `offset` holds
    // voters 24-offset, 23-offset, ...
    for (i, reward) in rewards.iter().enumerate() {
        let expected_voter = format!("io1voter{:02}", 24 - offset as usize - i);
        assert_eq!(reward.voter_address, expected_voter);
    }
}


#[test]
fn test_pagination_is_deterministic() {
    let store = empty_store();
    for i in 0..10u64 {
        insert_distribution(
            &store,
            100,
            &format!("hash{}", i),
            "metanyx",
            &format!("io1voter{}", i),
            "100",
            3000 + i
        );
    }
    let hermes = hermes_protocol(store);

    let first = hermes.rewards_by_delegate(range(), page(2, 4), "metanyx").unwrap();
    let second = hermes.rewards_by_delegate(range(), page(2, 4), "metanyx").unwrap();
    assert_eq!(first, second);
}


#[test]
fn test_hostile_source_address_stays_inert() {
    let store = empty_store();
    insert_distribution(&store, 100, "hash1", "metanyx", "io1voter1", "500", 1000);

    // A configured value full of quote characters must neither break the
    // statement nor alter its structure.
    let hermes = hermes_protocol_with_sources(store.clone(), vec![
        SOURCE_ADDRESS.to_string(),
        "evil') OR ('1'='1".to_string(),
        "x'); DROP TABLE balance_history; --".to_string()
    ]);

    let rewards = hermes.rewards_by_delegate(range(), page(0, 10), "metanyx").unwrap();
    assert_eq!(rewards.len(), 1);

    // The table is still there and still queryable.
    let check = store.query("SELECT COUNT(*) FROM balance_history", &[]).unwrap();
    assert_eq!(check.rows.len(), 1);
}


#[test]
fn test_distribution_ratio() {
    let store = empty_store();
    insert_ratio(&store, 100, "metanyx", 0.1, 0.7, 0.2);
    insert_ratio(&store, 101, "metanyx", 0.15, 0.65, 0.2);
    insert_ratio(&store, 101, "other", 0.5, 0.5, 0.0);
    let hermes = hermes_protocol(store);

    let ratios = hermes.distribution_ratio(range(), "metanyx").unwrap();
    assert_eq!(ratios, vec![
        DistributionRatio {
            block_reward_ratio: 0.1,
            epoch_reward_ratio: 0.7,
            foundation_bonus_ratio: 0.2,
            epoch_number: 100
        },
        DistributionRatio {
            block_reward_ratio: 0.15,
            epoch_reward_ratio: 0.65,
            foundation_bonus_ratio: 0.2,
            epoch_number: 101
        }
    ]);
}


#[test]
fn test_distribution_ratio_not_exist() {
    let hermes = hermes_protocol(empty_store());

    let err = hermes.distribution_ratio(range(), "metanyx").unwrap_err();
    assert!(err.chain().any(|cause| cause.is::<NotExist>()));
}


#[test]
fn test_count_by_delegate_matches_epoch_range_exactly() {
    let store = empty_store();
    // Epochs 99..=105; only 100..=104 are in range.
    for (i, epoch) in (99..=105u64).enumerate() {
        insert_distribution(
            &store,
            epoch,
            &format!("hash{}", i),
            "metanyx",
            &format!("io1voter{}", i),
            "100",
            4000 + i as u64
        );
    }
    let hermes = hermes_protocol(store);

    let count = hermes.count_by_delegate(range(), "metanyx").unwrap();
    assert_eq!(count.count, 5);
    assert_eq!(count.total, "500");
}


#[test]
fn test_count_by_voter() {
    let store = empty_store();
    insert_distribution(&store, 100, "hash1", "metanyx", "io1voter1", "250", 1000);
    insert_distribution(&store, 101, "hash2", "chainshield", "io1voter1", "100", 1010);
    insert_distribution(&store, 101, "hash3", "chainshield", "io1voter2", "999", 1020);
    let hermes = hermes_protocol(store);

    let count = hermes.count_by_voter(range(), "io1voter1").unwrap();
    assert_eq!(count.count, 2);
    assert_eq!(count.total, "350");
}


#[test]
fn test_count_over_empty_range_is_zero() {
    let hermes = hermes_protocol(empty_store());

    let count = hermes.count_by_delegate(range(), "metanyx").unwrap();
    assert_eq!(count.count, 0);
    assert_eq!(count.total, "0");
}


#[test]
fn test_distribution_meta() {
    let store = empty_store();
    insert_distribution(&store, 100, "hash1", "metanyx", "io1voter1", "500", 1000);
    insert_distribution(&store, 101, "hash2", "metanyx", "io1voter2", "700", 1010);
    insert_distribution(&store, 102, "hash3", "chainshield", "io1voter1", "300", 1020);
    let hermes = hermes_protocol(store);

    let meta = hermes.distribution_meta(range()).unwrap();
    assert_eq!(meta.delegate_count, 2);
    assert_eq!(meta.recipient_count, 2);
    assert_eq!(meta.total_amount, "1500");
}


#[test]
fn test_distribution_meta_over_empty_range_is_zero() {
    let hermes = hermes_protocol(empty_store());

    let meta = hermes.distribution_meta(range()).unwrap();
    assert_eq!(meta.delegate_count, 0);
    assert_eq!(meta.recipient_count, 0);
    assert_eq!(meta.total_amount, "0");
}
