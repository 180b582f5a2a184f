use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::domain::task::task::TaskKey;

/// A task waiting for placement together with its ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PendingEntry {
    pub priority: i64,

    /// Admission order, breaks priority ties.
    pub sequence: u64,

    pub key: TaskKey,
}

/// Global queue of tasks awaiting placement.
///
/// Pops the lowest priority value first. Equal priorities leave in admission order, also
/// for entries that are pushed back after having been blocked.
#[derive(Debug, Default)]
pub struct PendingQueue {
    heap: BinaryHeap<Reverse<PendingEntry>>,
    next_sequence: u64,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a new task behind every task of the same priority that is already known.
    pub fn push(&mut self, key: TaskKey, priority: i64) -> PendingEntry {
        let entry = PendingEntry { priority, sequence: self.next_sequence, key };
        self.next_sequence += 1;
        self.heap.push(Reverse(entry));
        entry
    }

    /// Puts an entry back with its original ordering key.
    pub fn push_entry(&mut self, entry: PendingEntry) {
        self.heap.push(Reverse(entry));
    }

    pub fn pop(&mut self) -> Option<PendingEntry> {
        self.heap.pop().map(|Reverse(entry)| entry)
    }

    pub fn contains(&self, key: TaskKey) -> bool {
        self.heap.iter().any(|Reverse(entry)| entry.key == key)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
