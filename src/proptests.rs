use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use proptest::prelude::*;

use crate::Error;
use crate::HashMap;

fn validate_map<V>(map: &HashMap<String, V>, initial_capacity: usize) {
    let stats = map.raw_table().debug_stats();
    assert_eq!(stats.populated, map.len());
    assert_eq!(stats.populated + stats.free, stats.allocated);
    assert!(stats.allocated <= stats.capacity);

    let growth = stats.capacity / initial_capacity;
    assert_eq!(stats.capacity % initial_capacity, 0);
    assert!(growth.is_power_of_two(), "capacity must only double");

    let hist = map.raw_table().chain_histogram();
    assert_eq!(hist.bins.iter().sum::<usize>(), stats.capacity);
    let chained: usize = hist.bins.iter().enumerate().map(|(len, n)| len * n).sum();
    assert_eq!(chained, stats.populated, "every live entry sits in one chain");
    assert_eq!(map.iter().count(), map.len());
}

#[derive(Clone, Debug)]
enum Op {
    Add(String, u32),
    Set(String, u32),
    Remove(String),
    Get(String),
    Clear,
}

fn key_strategy() -> impl Strategy<Value = String> + Clone {
    // A narrow alphabet keeps character sums close together, so most keys
    // share chains with their anagrams.
    "[A-F]{0,3}"
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        35 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Add(k, v)),
        15 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Set(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        24 => key.clone().prop_map(Op::Get),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=1000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(initial_capacity in 1usize..=16, ops in ops_strategy()) {
        let mut t: HashMap<String, u32> = HashMap::try_new(initial_capacity).unwrap();
        let mut m: BTreeMap<String, u32> = BTreeMap::new();
        let mut capacity = t.capacity();

        for op in ops {
            match op {
                Op::Add(key, value) => {
                    let got = t.add(key.clone(), value);
                    if m.contains_key(&key) {
                        prop_assert_eq!(got, Err(Error::DuplicateKey));
                    } else {
                        prop_assert_eq!(got, Ok(()));
                        m.insert(key, value);
                    }
                }
                Op::Set(key, value) => {
                    let old_t = t.set(key.clone(), value);
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, Ok(old_m));
                }
                Op::Remove(key) => {
                    let removed_t = t.remove(&key);
                    let removed_m = m.remove(&key).is_some();
                    prop_assert_eq!(removed_t, Ok(removed_m));
                }
                Op::Get(key) => {
                    let got_t = t.get(&key).copied();
                    let got_m = m.get(&key).copied().ok_or(Error::KeyNotFound);
                    prop_assert_eq!(got_t, got_m);
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(t.len(), m.len());
            prop_assert!(t.capacity() >= capacity, "capacity shrank");
            capacity = t.capacity();
        }

        validate_map(&t, initial_capacity);
        let mut got: Vec<(String, u32)> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
        got.sort();
        let expected: Vec<(String, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_reuse_never_grows(initial_capacity in 1usize..=64, rounds in 1usize..=8) {
        let mut t: HashMap<String, usize> = HashMap::try_new(initial_capacity).unwrap();
        for round in 0..rounds {
            for i in 0..initial_capacity {
                t.add(alloc::format!("{round}:{i}"), i).unwrap();
            }
            prop_assert_eq!(t.capacity(), initial_capacity);
            for i in 0..initial_capacity {
                prop_assert_eq!(t.remove(&alloc::format!("{round}:{i}")), Ok(true));
            }
        }
        prop_assert!(t.is_empty());
        validate_map(&t, initial_capacity);
    }
}
