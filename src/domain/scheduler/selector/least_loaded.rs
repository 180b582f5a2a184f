use std::cmp::Ordering;

use crate::domain::node::node_pool::NodePool;
use crate::domain::scheduler::node_selector::NodeSelector;
use crate::domain::task::task::Task;

/// Orders nodes by their current memory utilization, least loaded first.
///
/// The utilization is a snapshot taken when the order is computed. If the load of two nodes
/// is equal, their pool position decides.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeastLoadedSelector;

impl LeastLoadedSelector {
    pub fn new() -> Self {
        Self
    }

    fn compare(&self, a: &(usize, f64), b: &(usize, f64)) -> Ordering {
        match a.1.partial_cmp(&b.1) {
            Some(Ordering::Equal) | None => a.0.cmp(&b.0),
            Some(ord) => ord,
        }
    }
}

impl NodeSelector for LeastLoadedSelector {
    fn candidate_order(&self, pool: &NodePool, _task: &Task) -> Vec<usize> {
        let mut candidates: Vec<(usize, f64)> = pool.iter().enumerate().map(|(position, node)| (position, node.utilization())).collect();

        candidates.sort_by(|a, b| self.compare(a, b));
        candidates.into_iter().map(|(position, _)| position).collect()
    }

    fn name(&self) -> &'static str {
        "LeastLoaded"
    }
}
