//! Lock-protected handle for sharing one sequence across threads.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::crdt::config::SequenceConfig;
use crate::crdt::error::Result;
use crate::crdt::operation::Operation;
use crate::crdt::sequence::{Outcome, Sequence};

/// A cloneable handle to a sequence behind a read-write lock.
///
/// The engine itself assumes a single writer. This wrapper serializes every
/// mutating call under the write lock while letting read queries run
/// concurrently with each other.
#[derive(Debug, Clone, Default)]
pub struct SharedSequence {
    inner: Arc<RwLock<Sequence>>,
}

impl SharedSequence {
    pub fn new(config: SequenceConfig) -> Self {
        SharedSequence::from(Sequence::with_config(config))
    }

    /// Applies an operation under the write lock.
    pub fn insert(&self, op: Operation) -> Result<Outcome> {
        self.inner.write().insert(op)
    }

    /// Applies a batch under a single write lock, stopping at the first error.
    ///
    /// Operations before the failing one stay applied.
    pub fn insert_all<I>(&self, ops: I) -> Result<usize>
    where
        I: IntoIterator<Item = Operation>,
    {
        let mut seq = self.inner.write();
        let mut applied = 0;
        for op in ops {
            seq.insert(op)?;
            applied += 1;
        }
        Ok(applied)
    }

    pub fn size(&self) -> usize {
        self.inner.read().size()
    }

    pub fn row_count(&self) -> usize {
        self.inner.read().row_count()
    }

    /// Current content rendered as text.
    pub fn content(&self) -> String {
        self.inner.read().to_string()
    }

    /// Read access for traversal; writers wait until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<'_, Sequence> {
        self.inner.read()
    }
}

impl From<Sequence> for SharedSequence {
    fn from(seq: Sequence) -> Self {
        SharedSequence {
            inner: Arc::new(RwLock::new(seq)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crdt::types::Identifier;
    use std::thread;

    #[test]
    fn test_concurrent_writers_converge() {
        let shared = SharedSequence::default();
        let handles: Vec<_> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|actor| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let mut reference = Identifier::sentinel();
                    for counter in 1..=50u64 {
                        let id = Identifier::new(counter, actor);
                        shared
                            .insert(Operation::insert(id.clone(), reference, 'x'))
                            .unwrap();
                        reference = id;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.row_count(), 200);
        // Each actor's run stays contiguous; the largest first id leads.
        let seq = shared.read();
        let first: Vec<_> = seq.iter().step_by(50).map(|(id, _)| id.actor.to_string()).collect();
        assert_eq!(first, vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn test_insert_all_stops_at_error() {
        let shared = SharedSequence::default();
        let a = Identifier::new(1, "a");
        let ops = vec![
            Operation::insert(a.clone(), Identifier::sentinel(), 'x'),
            Operation::insert(a, Identifier::sentinel(), 'y'),
        ];
        assert!(shared.insert_all(ops).is_err());
        assert_eq!(shared.content(), "x");
    }
}
