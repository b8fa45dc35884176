use grind_core::{AggregateStore, BatchAggregator, CreditDelta, Message, PersonKey};
use grind_test_utils::*;
use proptest::prelude::*;

const IDS: [&str; 3] = [ADA, BOB, CY];

fn arb_message() -> impl Strategy<Value = Message> {
    (
        0..IDS.len(),
        proptest::collection::vec(0..IDS.len(), 0..4),
        0u32..50,
    )
        .prop_map(|(author, mentioned, secs)| {
            let ids: Vec<&str> = mentioned.into_iter().map(|i| IDS[i]).collect();
            msg(IDS[author], &mentioning(&ids), f64::from(secs))
        })
}

/// Oldest-first batch, as the chat source delivers it
fn arb_batch() -> impl Strategy<Value = Vec<Message>> {
    proptest::collection::vec(arb_message(), 0..30).prop_map(|mut batch| {
        batch.sort_by(|a, b| a.ts.partial_cmp(&b.ts).unwrap());
        batch
    })
}

proptest! {
    #[test]
    fn prop_rerun_is_idempotent(batch in arb_batch()) {
        let roster = test_roster();
        let aggregator = BatchAggregator::new(&roster);

        let once = aggregator.run(&AggregateStore::new(), &batch).unwrap();
        let twice = aggregator.run(&once.store, &batch).unwrap();

        prop_assert_eq!(&once.store, &twice.store);
        prop_assert_eq!(twice.summary.post_credits, 0);
    }

    #[test]
    fn prop_total_is_posts_plus_mentions(batch in arb_batch(), split in 0usize..30) {
        let roster = test_roster();
        let aggregator = BatchAggregator::new(&roster);
        let split = split.min(batch.len());

        let first = aggregator.run(&AggregateStore::new(), &batch[..split]).unwrap();
        let second = aggregator.run(&first.store, &batch[split..]).unwrap();

        for (_, row) in second.store.iter() {
            prop_assert_eq!(row.total, row.posts + row.mentions);
        }
    }

    #[test]
    fn prop_dedup_clock_never_decreases(
        batch in proptest::collection::vec(arb_message(), 0..30)
    ) {
        // Deliberately unsorted: the clock must hold even when order is violated
        let roster = test_roster();
        let aggregator = BatchAggregator::new(&roster);
        let mut store = AggregateStore::new();

        for message in batch {
            let before: Vec<_> = store.iter().map(|(k, r)| (k.clone(), r.last_seen)).collect();
            store = aggregator.run(&store, &[message]).unwrap().store;
            for (key, seen) in before {
                prop_assert!(row(&store, key.as_str()).last_seen >= seen);
            }
        }
    }

    #[test]
    fn prop_repeated_mention_counts_once(repeats in 1usize..6, secs in 1u32..1000) {
        let roster = test_roster();
        let text = mentioning(&vec![BOB; repeats]);
        let batch = vec![msg(ADA, &text, f64::from(secs))];

        let outcome = BatchAggregator::new(&roster).run(&AggregateStore::new(), &batch).unwrap();

        prop_assert_eq!(row(&outcome.store, BOB_NAME).mentions, 1);
        prop_assert_eq!(outcome.summary.mention_credits, 1);
    }

    #[test]
    fn prop_credit_sequence_consistent(posts in proptest::collection::vec(any::<bool>(), 0..40)) {
        let mut store = AggregateStore::new();
        let key = PersonKey::new(ADA_NAME);
        for (i, is_post) in posts.iter().enumerate() {
            let delta = if *is_post {
                CreditDelta::post(ts(i as f64 + 1.0))
            } else {
                CreditDelta::mention()
            };
            store.credit(key.clone(), delta);
        }
        if let Some(r) = store.get(&key) {
            prop_assert_eq!(r.total, posts.len() as u64);
            prop_assert_eq!(r.posts, posts.iter().filter(|p| **p).count() as u64);
            prop_assert!(store.inconsistent_rows().is_empty());
        } else {
            prop_assert!(posts.is_empty());
        }
    }
}
