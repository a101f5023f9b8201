//! Property-based tests for the invariants a hash ring must hold after any
//! sequence of add/remove operations, plus a fairness check over a uniform
//! fingerprint stream.

use proptest::prelude::*;
use ringcore::{AddOutcome, BackendId, RemoveOutcome, Ring};
use std::collections::HashMap;

fn backend(n: usize) -> BackendId {
    BackendId::new(format!("backend-{n}")).unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..8).prop_map(Op::Add),
        (0usize..8).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn consistency_and_injectivity_hold_after_any_sequence(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut ring = Ring::new(256, 16).unwrap();
        let mut present: HashMap<usize, bool> = HashMap::new();

        for op in ops {
            match op {
                Op::Add(n) => {
                    match ring.add(backend(n)) {
                        AddOutcome::Added(_) | AddOutcome::AlreadyPresent => {
                            present.insert(n, true);
                        }
                        AddOutcome::RingFull => {}
                    }
                }
                Op::Remove(n) => {
                    if let RemoveOutcome::Removed = ring.remove(&backend(n)) {
                        present.insert(n, false);
                    }
                }
            }
        }

        // Consistency + injectivity: every member's recorded slots map
        // back to exactly that member, and every occupied slot belongs to
        // some current member.
        for member in ring.members() {
            let slots = ring.slots_of(&member).unwrap();
            prop_assert!(!slots.is_empty());
            for &slot in slots {
                prop_assert_eq!(ring.lookup(slot), Some(member.clone()));
            }
        }

        // Replica bound: no member owns more than K=16 slots.
        for member in ring.members() {
            prop_assert!(ring.slots_of(&member).unwrap().len() <= 16);
        }
    }

    #[test]
    fn idempotent_add_and_remove(n in 0usize..8) {
        let mut ring = Ring::new(256, 16).unwrap();
        let id = backend(n);

        let first = ring.add(id.clone());
        prop_assert!(matches!(first, AddOutcome::Added(_)));
        let second = ring.add(id.clone());
        prop_assert_eq!(second, AddOutcome::AlreadyPresent);

        let removed = ring.remove(&id);
        prop_assert_eq!(removed, RemoveOutcome::Removed);
        let removed_again = ring.remove(&id);
        prop_assert_eq!(removed_again, RemoveOutcome::NotPresent);
    }

    #[test]
    fn round_trip_restores_empty_ring(n in 0usize..8) {
        let mut ring = Ring::new(256, 16).unwrap();
        let id = backend(n);
        ring.add(id.clone());
        ring.remove(&id);
        prop_assert_eq!(ring.occupied_count(), 0);
        prop_assert_eq!(ring.member_count(), 0);
    }
}

#[test]
fn removal_only_changes_routing_for_the_removed_backends_fingerprints() {
    let mut ring = Ring::new(512, 32).unwrap();
    for n in 0..6 {
        ring.add(backend(n));
    }

    let victim = backend(2);
    let before: Vec<_> = (0..512u32).map(|s| ring.lookup(s)).collect();
    ring.remove(&victim);
    let after: Vec<_> = (0..512u32).map(|s| ring.lookup(s)).collect();

    for (slot, (pre, post)) in before.iter().zip(after.iter()).enumerate() {
        if *pre != Some(victim.clone()) {
            assert_eq!(pre, post, "fingerprint {slot} should not have been affected");
        }
    }
}

#[test]
fn fairness_coefficient_of_variation_is_bounded_with_k_100() {
    let n_backends = 5;
    let k = 100;
    let capacity = 8192;
    let requests = 20_000u32;

    let mut ring = Ring::new(capacity, k).unwrap();
    for n in 0..n_backends {
        assert!(matches!(ring.add(backend(n)), AddOutcome::Added(_)));
    }

    let mut counts: HashMap<BackendId, u32> = HashMap::new();
    for fp in 0..requests {
        // Spread fingerprints uniformly across [0, capacity) rather than
        // reusing the ring's own hash, so this test doesn't validate the
        // hash function and the ring with the same code path.
        let slot = (ringcore::hash::hash_bytes(&fp.to_le_bytes()) % capacity as u64) as u32;
        if let Some(owner) = ring.lookup(slot) {
            *counts.entry(owner).or_insert(0) += 1;
        }
    }

    let values: Vec<f64> = counts.values().map(|&c| c as f64).collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let cv = variance.sqrt() / mean;

    assert!(
        cv <= 0.15,
        "coefficient of variation {cv} exceeded 0.15 threshold"
    );
}
