// WeakHashMap property tests (model-based).
//
// Model: a fixed number of key slots. Each slot tracks
//  - key: the current Rc allocation playing that slot's key (replaced by
//    a fresh allocation after a simulated key reclamation),
//  - val: our only strong reference to the stored value,
//  - present: whether an entry exists for the current key allocation,
//  - value_alive: whether that entry's value still resolves.
// Entries whose key allocation was dropped while present become zombies:
// still stored and counted, unreachable by lookup, removed by purge or by
// a drained live() pass.
//
// Invariants asserted after every step:
//  - len() counts live and dead entries alike (present slots + zombies).
//  - contains_key() for the current allocation matches the model.
// Operations: strict insert, replace, remove, reclaim-value, reclaim-key,
// purge, tri-state lookup, full live() drain.
use proptest::prelude::*;
use std::rc::Rc;
use weak_hashmap::WeakHashMap;

proptest! {
    #[test]
    fn prop_weak_hash_map_matches_model(
        keys in 1usize..=5,
        ops in proptest::collection::vec((0u8..=7u8, 0usize..100usize), 1..100),
    ) {
        let mut m: WeakHashMap<String, String> = WeakHashMap::new();
        let mut key: Vec<Rc<String>> =
            (0..keys).map(|i| Rc::new(format!("k{i}"))).collect();
        let mut val: Vec<Option<Rc<String>>> = vec![None; keys];
        let mut present = vec![false; keys];
        let mut value_alive = vec![false; keys];
        let mut zombies = 0usize;

        for (op, raw) in ops {
            let i = raw % keys;
            match op {
                // Strict insert succeeds iff no entry for this allocation,
                // dead value or not.
                0 => {
                    let v = Rc::new(format!("v{i}"));
                    let res = m.insert(&key[i], &v);
                    if present[i] {
                        prop_assert!(res.is_err());
                    } else {
                        prop_assert!(res.is_ok());
                        present[i] = true;
                        value_alive[i] = true;
                        val[i] = Some(v);
                    }
                }
                // Replace always leaves one fresh live entry.
                1 => {
                    let v = Rc::new(format!("v{i}"));
                    m.set(&key[i], &v);
                    present[i] = true;
                    value_alive[i] = true;
                    val[i] = Some(v);
                }
                // Remove reports whether an entry existed.
                2 => {
                    prop_assert_eq!(m.remove(&key[i]), present[i]);
                    present[i] = false;
                    value_alive[i] = false;
                    val[i] = None;
                }
                // Reclaim the value: the entry stays, dead on one side.
                3 => {
                    val[i] = None;
                    value_alive[i] = false;
                }
                // Reclaim the key: a present entry becomes a zombie and a
                // fresh allocation takes over the slot.
                4 => {
                    if present[i] {
                        zombies += 1;
                        present[i] = false;
                        value_alive[i] = false;
                        val[i] = None;
                    }
                    key[i] = Rc::new(format!("k{i}"));
                }
                // Purge drops every dead-sided entry and all zombies.
                5 => {
                    m.purge();
                    zombies = 0;
                    for j in 0..keys {
                        if present[j] && !value_alive[j] {
                            present[j] = false;
                        }
                    }
                }
                // Tri-state lookup must match the model exactly.
                6 => {
                    match m.get(&key[i]) {
                        None => prop_assert!(!present[i]),
                        Some(None) => prop_assert!(present[i] && !value_alive[i]),
                        Some(Some(v)) => {
                            prop_assert!(present[i] && value_alive[i]);
                            prop_assert!(Rc::ptr_eq(&v, val[i].as_ref().unwrap()));
                        }
                    }
                }
                // A drained live() pass yields exactly the live pairs and
                // then behaves as a purge over what it visited.
                7 => {
                    let pairs: Vec<_> = m.live().collect();
                    let expected =
                        (0..keys).filter(|&j| present[j] && value_alive[j]).count();
                    prop_assert_eq!(pairs.len(), expected);
                    zombies = 0;
                    for j in 0..keys {
                        if present[j] && !value_alive[j] {
                            present[j] = false;
                        }
                    }
                }
                _ => unreachable!(),
            }

            // len counts live and dead entries alike.
            let expected_len =
                (0..keys).filter(|&j| present[j]).count() + zombies;
            prop_assert_eq!(m.len(), expected_len);
            prop_assert_eq!(m.contains_key(&key[i]), present[i]);
        }
    }
}
