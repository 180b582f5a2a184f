use std::cmp::Ordering;

use crate::domain::node::node_pool::NodePool;
use crate::domain::scheduler::node_selector::NodeSelector;
use crate::domain::task::task::Task;

/// Prefers the node that is left with the least free memory after placing the task.
///
/// Nodes the task does not fit on are moved to the end of the order. Equal leftovers are
/// broken by pool position.
#[derive(Debug, Default, Clone, Copy)]
pub struct BestFitSelector;

impl BestFitSelector {
    pub fn new() -> Self {
        Self
    }

    /// Returns `Ordering::Less`, if the candidate `a` is the tighter fit.
    fn compare(&self, a: &(usize, i64), b: &(usize, i64)) -> Ordering {
        let (position_a, leftover_a) = *a;
        let (position_b, leftover_b) = *b;

        match (leftover_a >= 0, leftover_b >= 0) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => position_a.cmp(&position_b),
            (true, true) => leftover_a.cmp(&leftover_b).then(position_a.cmp(&position_b)),
        }
    }
}

impl NodeSelector for BestFitSelector {
    fn candidate_order(&self, pool: &NodePool, task: &Task) -> Vec<usize> {
        let mut candidates: Vec<(usize, i64)> =
            pool.iter().enumerate().map(|(position, node)| (position, node.free_memory() - task.memory_needed)).collect();

        candidates.sort_by(|a, b| self.compare(a, b));
        candidates.into_iter().map(|(position, _)| position).collect()
    }

    fn name(&self) -> &'static str {
        "BestFit"
    }
}
