//! Integration tests for the sequence CRDT.
//!
//! These tests verify convergence, causal buffering and tie-break behaviour
//! across replicas fed the same operations in different orders.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rga_sequence::{Clock, Codec, Identifier, Operation, Outcome, Sequence, SequenceConfig, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn id(counter: u64, actor: &str) -> Identifier {
    Identifier::new(counter, actor)
}

fn replay(ops: &[Operation]) -> Sequence {
    let mut seq = Sequence::default();
    for op in ops {
        seq.insert(op.clone()).unwrap();
    }
    seq
}

fn visiting_order(seq: &Sequence) -> Vec<Identifier> {
    seq.elements().map(|e| e.id().clone()).collect()
}

/// Three replicas type concurrently, reply to each other and delete a few
/// characters. Every operation references something that eventually exists.
fn collaborative_history() -> Vec<Operation> {
    let mut ops = Vec::new();
    let alice = Clock::new("alice");
    let bob = Clock::new("bob");
    let carol = Clock::new("carol");

    let mut last = Identifier::sentinel();
    for ch in "Hello".chars() {
        let next = alice.tick();
        ops.push(Operation::insert(next.clone(), last, ch));
        last = next;
    }
    let hello_end = last.clone();

    // Bob and Carol both append after "Hello" without seeing each other.
    for (clock, text) in [(&bob, " world"), (&carol, " there")] {
        clock.observe(&hello_end);
        let mut last = hello_end.clone();
        for ch in text.chars() {
            let next = clock.tick();
            ops.push(Operation::insert(next.clone(), last, ch));
            last = next;
        }
    }

    // Alice prepends concurrently with everything else.
    let bang = alice.tick();
    ops.push(Operation::insert(bang, Identifier::sentinel(), '>'));

    // Deletes of Bob's leading space and of Alice's 'e'.
    ops.push(Operation::delete(carol.tick(), id(6, "bob")));
    ops.push(Operation::delete(bob.tick(), id(2, "alice")));
    ops
}

#[test]
fn test_hi_scenario() {
    init_tracing();
    let mut seq = Sequence::new(Codec::VarInt);

    seq.insert(Operation::insert(id(1, "a"), Identifier::sentinel(), 'h')).unwrap();
    seq.insert(Operation::insert(id(2, "a"), id(1, "a"), 'i')).unwrap();
    assert_eq!(seq.to_string(), "hi");
    assert_eq!(seq.row_count(), 2);

    seq.insert(Operation::delete(id(3, "a"), id(1, "a"))).unwrap();
    assert_eq!(seq.to_string(), "i");
    assert_eq!(seq.row_count(), 1);
}

#[test]
fn test_convergence_under_permutation() {
    init_tracing();
    let ops = collaborative_history();
    let expected = replay(&ops);
    assert_eq!(expected.to_string(), ">Hllo thereworld");

    for seed in 1..=25u64 {
        let mut shuffled = ops.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
        let seq = replay(&shuffled);

        assert_eq!(visiting_order(&seq), visiting_order(&expected), "seed {seed}");
        assert_eq!(seq.to_string(), expected.to_string());
        assert_eq!(seq.row_count(), expected.row_count());
        assert_eq!(seq.size(), expected.size());
        assert_eq!(seq.pending_len(), 0);
    }
}

#[test]
fn test_reverse_delivery_converges() {
    let ops = collaborative_history();
    let forward = replay(&ops);
    let mut reversed = ops.clone();
    reversed.reverse();
    let backward = replay(&reversed);

    assert_eq!(backward.to_string(), forward.to_string());
    assert_eq!(backward.size(), forward.size());
}

#[test]
fn test_sibling_determinism() {
    let r = id(1, "a");
    let a = Operation::insert(id(2, "a"), r.clone(), 'A');
    let b = Operation::insert(id(2, "b"), r.clone(), 'B');
    let root = Operation::insert(r, Identifier::sentinel(), 'R');

    let ab = replay(&[root.clone(), a.clone(), b.clone()]);
    let ba = replay(&[root, b, a]);

    // (2, "b") > (2, "a"), so B sits closer to R.
    assert_eq!(ab.to_string(), "RBA");
    assert_eq!(ba.to_string(), "RBA");
}

#[test]
fn test_idempotent_delete() {
    let mut once = Sequence::default();
    let mut twice = Sequence::default();
    let insert = Operation::insert(id(1, "a"), Identifier::sentinel(), 'x');
    let delete = Operation::delete(id(2, "a"), id(1, "a"));

    for seq in [&mut once, &mut twice] {
        seq.insert(insert.clone()).unwrap();
        seq.insert(delete.clone()).unwrap();
    }
    assert_eq!(
        twice.insert(delete).unwrap(),
        Outcome::Applied {
            created: 0,
            tombstoned: 0
        }
    );

    assert_eq!(once.size(), twice.size());
    assert_eq!(once.row_count(), twice.row_count());
    assert_eq!(once.records().unwrap(), twice.records().unwrap());
}

#[test]
fn test_causal_buffering() {
    init_tracing();
    let mut seq = Sequence::default();
    seq.insert(Operation::insert(id(1, "a"), Identifier::sentinel(), 'a')).unwrap();
    let (rows, size) = (seq.row_count(), seq.size());

    // (3, a) follows (2, b), which has not arrived yet.
    let outcome = seq.insert(Operation::insert(id(3, "a"), id(2, "b"), 'c')).unwrap();
    assert_eq!(outcome, Outcome::Pending);
    assert_eq!(seq.row_count(), rows);
    assert_eq!(seq.size(), size);
    assert_eq!(seq.missing_references(), vec![id(2, "b")]);

    // A delete of an element that has not arrived waits too.
    seq.insert(Operation::delete(id(4, "a"), id(9, "z"))).unwrap();
    assert_eq!(seq.pending_len(), 2);

    let outcome = seq.insert(Operation::insert(id(2, "b"), id(1, "a"), 'b')).unwrap();
    assert_eq!(
        outcome,
        Outcome::Applied {
            created: 2,
            tombstoned: 0
        }
    );
    assert_eq!(seq.row_count(), rows + 2);
    assert_eq!(seq.to_string(), "abc");
    assert_eq!(seq.missing_references(), vec![id(9, "z")]);

    let unresolved = seq.take_unresolved();
    assert_eq!(unresolved, vec![Operation::delete(id(4, "a"), id(9, "z"))]);
    assert_eq!(seq.pending_len(), 0);
}

#[test]
fn test_sequential_typing_size_is_compact() {
    let mut seq = Sequence::new(Codec::VarInt);
    let clock = Clock::new("abc");
    let mut last = Identifier::sentinel();
    let n = 5_000u64;

    let mut previous_size = seq.size();
    for i in 0..n {
        let next = clock.tick();
        let ch = char::from(b'a' + (i % 26) as u8);
        seq.insert(Operation::insert(next.clone(), last, ch)).unwrap();
        last = next;

        let grown = seq.size() - previous_size;
        // Counter (at most 2 bytes here) + 1 byte of ASCII, plus the actor once.
        assert!(grown <= 4 + 4, "element {i} grew size by {grown}");
        previous_size = seq.size();
    }

    assert_eq!(seq.row_count(), n as usize);
    assert!(seq.size() <= 4 + 3 * n as usize);
}

#[test]
fn test_tombstone_payload_is_discarded() {
    let mut seq = Sequence::new(Codec::Utf8);
    seq.insert(Operation::insert(id(1, "a"), Identifier::sentinel(), '🦀')).unwrap();
    let live_size = seq.size();

    seq.insert(Operation::delete(id(2, "a"), id(1, "a"))).unwrap();

    // Only the 4-byte UTF-8 payload goes away; the identity stays.
    assert_eq!(seq.size(), live_size - 4);
    assert!(seq.size() > 0);
    let element = seq.get(&id(1, "a")).unwrap();
    assert!(element.is_tombstoned());
    assert_eq!(element.value(), None);
}

#[test]
fn test_insert_after_tombstone() {
    let mut seq = Sequence::default();
    seq.insert(Operation::insert(id(1, "a"), Identifier::sentinel(), 'a')).unwrap();
    seq.insert(Operation::insert(id(2, "a"), id(1, "a"), 'b')).unwrap();
    seq.insert(Operation::delete(id(3, "a"), id(1, "a"))).unwrap();

    // A replica that had not seen the delete still inserts after (1, a).
    seq.insert(Operation::insert(id(3, "b"), id(1, "a"), 'x')).unwrap();
    assert_eq!(seq.to_string(), "xb");
    assert_eq!(seq.reference_of(&id(3, "b")), Some(&id(1, "a")));
}

#[test]
fn test_replicas_exchange_operations() {
    let clock1 = Clock::new("r1");
    let clock2 = Clock::new("r2");
    let mut log1 = Vec::new();
    let mut log2 = Vec::new();

    let mut last = Identifier::sentinel();
    for ch in "abc".chars() {
        let next = clock1.tick();
        log1.push(Operation::insert(next.clone(), last, ch));
        last = next;
    }
    let mut last = Identifier::sentinel();
    for ch in "xyz".chars() {
        let next = clock2.tick();
        log2.push(Operation::insert(next.clone(), last, ch));
        last = next;
    }

    let mut replica1 = replay(&log1);
    let mut replica2 = replay(&log2);
    for op in &log2 {
        replica1.insert(op.clone()).unwrap();
    }
    for op in &log1 {
        replica2.insert(op.clone()).unwrap();
    }

    assert_eq!(replica1.to_string(), replica2.to_string());
    assert_eq!(replica1.to_string(), "xyzabc");
}

#[test]
fn test_values_are_scalars() {
    let mut seq = Sequence::with_config(SequenceConfig::default());
    let mut last = Identifier::sentinel();
    for (counter, raw) in [(1u64, 7u64), (2, 300), (3, u64::MAX)] {
        let next = id(counter, "n");
        seq.insert(Operation::insert(next.clone(), last, Value::new(raw))).unwrap();
        last = next;
    }
    let values: Vec<u64> = seq.values().map(Value::get).collect();
    assert_eq!(values, vec![7, 300, u64::MAX]);
}
