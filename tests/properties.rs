//! Property tests of the multiset against simple `Vec` and `BTreeMap` models

use ordered_multiset::{Error, OrderedMultiset};
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Op {
    Add(i16),
    Remove(i16),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            (-20i16..20).prop_map(Op::Add),
            (-20i16..20).prop_map(Op::Remove),
        ],
        0..300,
    )
}

fn tally(values: &[i16]) -> BTreeMap<i16, usize> {
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(*value).or_insert(0) += 1;
    }
    counts
}

proptest! {
    #[test]
    fn prop_iteration_stays_sorted(ops in ops()) {
        let mut set = OrderedMultiset::new();
        for op in ops {
            match op {
                Op::Add(v) => set.add(v),
                Op::Remove(v) => {
                    set.remove(&v);
                }
            }
            let values: Vec<i16> = set.iter().copied().collect();
            prop_assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }

    #[test]
    fn prop_count_is_adds_minus_removes(value in -5i16..5, adds in 0usize..20, removes in 0usize..30) {
        let mut set = OrderedMultiset::from_sequence([-100, 100]);
        for _ in 0..adds {
            set.add(value);
        }
        for _ in 0..removes {
            set.remove(&value);
        }
        prop_assert_eq!(set.count(&value), adds.saturating_sub(removes));
        prop_assert_eq!(set.len(), 2 + adds.saturating_sub(removes));
    }

    #[test]
    fn prop_size_is_sum_of_counts(ops in ops()) {
        let mut set = OrderedMultiset::new();
        let mut model = Vec::new();
        for op in ops {
            match op {
                Op::Add(v) => {
                    set.add(v);
                    model.push(v);
                }
                Op::Remove(v) => {
                    if set.remove(&v).is_some() {
                        let at = model.iter().position(|x| *x == v).unwrap();
                        model.swap_remove(at);
                    }
                }
            }
        }
        let counts = tally(&model);
        prop_assert_eq!(set.len(), counts.values().sum::<usize>());
        for (value, count) in counts {
            prop_assert_eq!(set.count(&value), count);
        }
    }

    #[test]
    fn prop_bulk_matches_any_insertion_order(
        values in prop::collection::vec(-50i16..50, 0..200),
        seed in any::<u64>(),
    ) {
        let bulk = OrderedMultiset::from_sequence(values.iter().copied());

        let mut order = values.clone();
        let len = order.len();
        if len > 1 {
            // Fisher-Yates driven by the generated seed
            for i in (1..len).rev() {
                let j = (seed as usize).wrapping_mul(i + 31) % (i + 1);
                order.swap(i, j);
            }
        }
        let mut single = OrderedMultiset::new();
        for value in order {
            single.add(value);
        }

        prop_assert_eq!(&bulk, &single);
        for (value, count) in tally(&values) {
            prop_assert_eq!(bulk.count(&value), count);
        }
    }

    #[test]
    fn prop_lower_bound(values in prop::collection::vec(-50i16..50, 0..100), key in -60i16..60) {
        let set = OrderedMultiset::from_sequence(values.iter().copied());
        let expected = values.iter().filter(|v| **v >= key).min();
        match expected {
            Some(min) => prop_assert_eq!(set.search_higher_equal(&key), Ok(min)),
            None => prop_assert_eq!(set.search_higher_equal(&key), Err(Error::NotFound)),
        }
    }

    #[test]
    fn prop_removing_absent_keeps_size(values in prop::collection::vec(0i16..50, 0..100), key in 50i16..100) {
        let mut set = OrderedMultiset::from_sequence(values.iter().copied());
        let len = set.len();
        prop_assert_eq!(set.remove(&key), None);
        prop_assert_eq!(set.len(), len);

        let mut empty = OrderedMultiset::<i16>::new();
        prop_assert_eq!(empty.remove(&key), None);
        prop_assert_eq!(empty.len(), 0);
    }
}
