use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::domain::task::task::{Task, TaskKey};
use crate::domain::utils::id::NodeId;
use crate::error::{Error, Result};

/// Description of a compute node as handed over at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    pub id: NodeId,

    /// Memory capacity. Must be positive.
    pub total_memory: i64,

    /// Compute units processed per second. Must be positive.
    pub compute_rate: f64,

    /// Fixed overhead in seconds added to every task processed on this node.
    pub latency: f64,
}

impl NodeDescriptor {
    pub fn new(id: impl Into<String>, total_memory: i64, compute_rate: f64, latency: f64) -> Self {
        Self { id: NodeId::new(id), total_memory, compute_rate, latency }
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_memory <= 0 {
            return Err(self.invalid(format!("total_memory must be positive, got {}", self.total_memory)));
        }

        if !self.compute_rate.is_finite() || self.compute_rate <= 0.0 {
            return Err(self.invalid(format!("compute_rate must be positive, got {}", self.compute_rate)));
        }

        if !self.latency.is_finite() || self.latency < 0.0 {
            return Err(self.invalid(format!("latency must not be negative, got {}", self.latency)));
        }

        Ok(())
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidNodeDescriptor { id: self.id.to_string(), reason }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LedgerEntry {
    key: TaskKey,
    memory_needed: i64,
}

/// Memory bookkeeping of one node.
///
/// `used_memory` is always the sum over `local_queue` and `running`. A popped task keeps its
/// memory until it is released.
#[derive(Debug, Default)]
struct NodeLedger {
    used_memory: i64,
    local_queue: VecDeque<LedgerEntry>,
    running: Vec<LedgerEntry>,
}

impl NodeLedger {
    /// `used_memory <= total_memory` holds, so the subtraction cannot overflow.
    fn has_capacity_for(&self, memory_needed: i64, total_memory: i64) -> bool {
        memory_needed <= total_memory - self.used_memory
    }
}

/// A resource bounded execution target.
///
/// All ledger mutations go through one mutex, so `allocate`, `release` and `pop_next` are
/// linearizable per node.
#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub total_memory: i64,
    pub compute_rate: f64,
    pub latency: f64,
    ledger: Mutex<NodeLedger>,
}

impl Node {
    pub fn new(descriptor: NodeDescriptor) -> Result<Self> {
        descriptor.validate()?;

        Ok(Self {
            id: descriptor.id,
            total_memory: descriptor.total_memory,
            compute_rate: descriptor.compute_rate,
            latency: descriptor.latency,
            ledger: Mutex::new(NodeLedger::default()),
        })
    }

    fn ledger(&self) -> MutexGuard<'_, NodeLedger> {
        self.ledger.lock().expect("Node ledger lock poisoned")
    }

    pub fn has_capacity_for(&self, task: &Task) -> bool {
        self.ledger().has_capacity_for(task.memory_needed, self.total_memory)
    }

    /// Appends the task to the local queue and books its memory, if it fits.
    ///
    /// # Returns
    /// `false` without any side effect if the task does not fit.
    pub fn allocate(&self, task: &Task) -> bool {
        let mut ledger = self.ledger();

        if !ledger.has_capacity_for(task.memory_needed, self.total_memory) {
            return false;
        }

        ledger.used_memory += task.memory_needed;
        ledger.local_queue.push_back(LedgerEntry { key: task.key, memory_needed: task.memory_needed });
        true
    }

    /// Removes the task from this node, whether queued or running, and frees its memory.
    ///
    /// # Returns
    /// `false` if the node did not hold the task. Nothing is changed in that case.
    pub fn release(&self, task: &Task) -> bool {
        self.release_key(task.key)
    }

    pub(crate) fn release_key(&self, key: TaskKey) -> bool {
        let mut ledger = self.ledger();

        let entry = if let Some(position) = ledger.local_queue.iter().position(|entry| entry.key == key) {
            ledger.local_queue.remove(position)
        } else if let Some(position) = ledger.running.iter().position(|entry| entry.key == key) {
            Some(ledger.running.swap_remove(position))
        } else {
            None
        };

        match entry {
            Some(entry) => {
                ledger.used_memory -= entry.memory_needed;
                true
            }
            None => false,
        }
    }

    /// Takes the head of the local queue for execution.
    ///
    /// The task moves into the running slot and stays booked there until [`Node::release`]
    /// or [`Node::requeue_front`] is called for it. Running tasks count towards
    /// `used_memory` and towards the capacity check of [`Node::allocate`], just like queued ones.
    pub fn pop_next(&self) -> Option<TaskKey> {
        let mut ledger = self.ledger();
        let entry = ledger.local_queue.pop_front()?;
        ledger.running.push(entry);
        Some(entry.key)
    }

    /// Puts a running task back at the head of the local queue. Its memory stays booked.
    pub fn requeue_front(&self, task: &Task) -> bool {
        let mut ledger = self.ledger();

        match ledger.running.iter().position(|entry| entry.key == task.key) {
            Some(position) => {
                let entry = ledger.running.swap_remove(position);
                ledger.local_queue.push_front(entry);
                true
            }
            None => false,
        }
    }

    pub fn used_memory(&self) -> i64 {
        self.ledger().used_memory
    }

    pub fn free_memory(&self) -> i64 {
        self.total_memory - self.used_memory()
    }

    /// Booked share of the memory capacity, from 0.0 to 1.0.
    pub fn utilization(&self) -> f64 {
        self.used_memory() as f64 / self.total_memory as f64
    }

    pub fn queued_tasks(&self) -> Vec<TaskKey> {
        self.ledger().local_queue.iter().map(|entry| entry.key).collect()
    }

    pub fn running_tasks(&self) -> Vec<TaskKey> {
        self.ledger().running.iter().map(|entry| entry.key).collect()
    }

    pub fn holds(&self, key: TaskKey) -> bool {
        let ledger = self.ledger();
        ledger.local_queue.iter().chain(ledger.running.iter()).any(|entry| entry.key == key)
    }

    pub fn is_idle(&self) -> bool {
        let ledger = self.ledger();
        ledger.local_queue.is_empty() && ledger.running.is_empty()
    }

    /// Checks `used_memory == sum(held tasks)` and `used_memory <= total_memory`, where the held
    /// tasks are the local queue plus the running slot.
    pub fn ledger_is_consistent(&self) -> bool {
        let ledger = self.ledger();
        let held: i64 = ledger.local_queue.iter().chain(ledger.running.iter()).map(|entry| entry.memory_needed).sum();
        ledger.used_memory == held && ledger.used_memory >= 0 && ledger.used_memory <= self.total_memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::task::TaskDescriptor;
    use crate::domain::task::task_store::TaskStore;

    fn task(store: &TaskStore, id: &str, memory: i64) -> Task {
        let key = store.add(&TaskDescriptor::new(id, 10.0, memory, 1)).unwrap();
        store.get(key).unwrap()
    }

    #[test]
    fn node_descriptor_validation() {
        assert!(NodeDescriptor::new("n", 100, 50.0, 0.0).validate().is_ok());
        assert!(NodeDescriptor::new("n", 0, 50.0, 0.0).validate().is_err());
        assert!(NodeDescriptor::new("n", 100, 0.0, 0.0).validate().is_err());
        assert!(NodeDescriptor::new("n", 100, 50.0, -0.1).validate().is_err());
        assert!(NodeDescriptor::new("n", 100, f64::INFINITY, 0.0).validate().is_err());
    }

    #[test]
    fn allocate_respects_capacity() {
        let store = TaskStore::new();
        let node = Node::new(NodeDescriptor::new("n", 100, 50.0, 0.0)).unwrap();
        let a = task(&store, "a", 60);
        let b = task(&store, "b", 60);
        let c = task(&store, "c", 40);

        assert!(node.allocate(&a));
        assert!(!node.has_capacity_for(&b));
        assert!(!node.allocate(&b));
        assert!(node.allocate(&c));

        assert_eq!(node.used_memory(), 100);
        assert_eq!(node.queued_tasks(), vec![a.key, c.key]);
        assert!(node.ledger_is_consistent());
    }

    #[test]
    fn pop_keeps_memory_until_release() {
        let store = TaskStore::new();
        let node = Node::new(NodeDescriptor::new("n", 100, 50.0, 0.0)).unwrap();
        let a = task(&store, "a", 30);
        let b = task(&store, "b", 20);
        node.allocate(&a);
        node.allocate(&b);

        assert_eq!(node.pop_next(), Some(a.key));
        assert_eq!(node.used_memory(), 50);
        assert_eq!(node.running_tasks(), vec![a.key]);
        assert!(node.ledger_is_consistent());

        assert!(node.release(&a));
        assert_eq!(node.used_memory(), 20);
        assert!(!node.release(&a));
        assert_eq!(node.used_memory(), 20);
        assert!(node.ledger_is_consistent());
    }

    #[test]
    fn release_of_unknown_task_is_a_no_op() {
        let store = TaskStore::new();
        let node = Node::new(NodeDescriptor::new("n", 100, 50.0, 0.0)).unwrap();
        let a = task(&store, "a", 30);

        assert!(!node.release(&a));
        assert_eq!(node.used_memory(), 0);
        assert_eq!(node.pop_next(), None);
    }

    #[test]
    fn requeue_front_restores_fifo_head() {
        let store = TaskStore::new();
        let node = Node::new(NodeDescriptor::new("n", 100, 50.0, 0.0)).unwrap();
        let a = task(&store, "a", 30);
        let b = task(&store, "b", 20);
        node.allocate(&a);
        node.allocate(&b);

        node.pop_next();
        assert!(node.requeue_front(&a));
        assert_eq!(node.queued_tasks(), vec![a.key, b.key]);
        assert_eq!(node.used_memory(), 50);
        assert!(!node.requeue_front(&a));
    }

    #[test]
    fn capacity_check_does_not_overflow_near_i64_max() {
        let store = TaskStore::new();
        let node = Node::new(NodeDescriptor::new("n", i64::MAX, 1.0, 0.0)).unwrap();
        let one = task(&store, "one", 1);
        let huge = task(&store, "huge", i64::MAX);

        assert!(node.allocate(&one));
        assert!(!node.has_capacity_for(&huge));
        assert!(!node.allocate(&huge));
        assert_eq!(node.used_memory(), 1);
        assert!(node.ledger_is_consistent());
    }

    #[test]
    fn running_task_still_counts_against_capacity() {
        let store = TaskStore::new();
        let node = Node::new(NodeDescriptor::new("n", 100, 50.0, 0.0)).unwrap();
        let running = task(&store, "running", 70);
        let other = task(&store, "other", 40);

        node.allocate(&running);
        node.pop_next();

        assert!(node.queued_tasks().is_empty());
        assert!(!node.allocate(&other));
        assert!(node.ledger_is_consistent());
    }
}
