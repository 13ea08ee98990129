// HashMap property tests.
//
// Model: BTreeMap<Vec<u8>, u32> receiving the same puts.
// Invariants checked after every operation:
//  - get(k) matches the model for every key in the key space;
//  - len() == model.len() and len() <= threshold();
//  - cap() is a power of two and never decreases;
//  - keys() equals the model's (already sorted) key list;
//  - average_probe_count() >= 1.0 whenever the map is non-empty.
use std::collections::BTreeMap;

use proptest::prelude::*;
use rhh::HashMap;
use rhh::Options;

fn key_for(raw: u16, keys: u16) -> Vec<u8> {
    let k = raw % keys;
    // Short keys share prefixes so byte ordering is exercised.
    let mut key = b"m".repeat((k % 3) as usize + 1);
    key.extend_from_slice(&k.to_be_bytes());
    key
}

proptest! {
    #[test]
    fn prop_matches_btree_model(
        capacity in 0usize..64,
        load_factor in 1u8..=99,
        keys in 1u16..=200,
        ops in proptest::collection::vec((any::<bool>(), any::<u16>(), any::<u32>()), 1..300),
    ) {
        let mut map = HashMap::with_options(Options { capacity, load_factor });
        let mut model: BTreeMap<Vec<u8>, u32> = BTreeMap::new();
        let mut cap = map.cap();

        for (is_put, raw, value) in ops {
            let key = key_for(raw, keys);
            if is_put {
                let previous = map.put(key.as_slice(), value);
                prop_assert_eq!(previous, model.insert(key.clone(), value));
            } else {
                prop_assert_eq!(map.get(&key), model.get(&key));
            }

            prop_assert_eq!(map.len(), model.len());
            prop_assert!(map.len() <= map.threshold());
            prop_assert!(map.cap().is_power_of_two());
            prop_assert!(map.cap() >= cap);
            cap = map.cap();
            if !map.is_empty() {
                prop_assert!(map.average_probe_count() >= 1.0);
            }
        }

        let expected: Vec<&[u8]> = model.keys().map(Vec::as_slice).collect();
        prop_assert_eq!(map.keys(), expected);
        for (key, value) in &model {
            prop_assert_eq!(map.get(key), Some(value));
        }
    }

    #[test]
    fn prop_overwrite_keeps_len(
        keys in proptest::collection::btree_set(
            proptest::collection::vec(any::<u8>(), 0..12),
            1..100,
        ),
    ) {
        let mut map = HashMap::with_options(Options::DEFAULT.with_capacity(4));
        for key in &keys {
            prop_assert_eq!(map.put(key.as_slice(), 1u8), None);
        }
        let len = map.len();
        let cap = map.cap();

        for key in &keys {
            prop_assert_eq!(map.put(key.clone(), 2u8), Some(1));
        }
        prop_assert_eq!(map.len(), len);
        prop_assert!(map.cap() >= cap);
        for key in &keys {
            prop_assert_eq!(map.get(key), Some(&2));
        }
    }
}
