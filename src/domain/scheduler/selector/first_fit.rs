use crate::domain::node::node_pool::NodePool;
use crate::domain::scheduler::node_selector::NodeSelector;
use crate::domain::task::task::Task;

/// Tries nodes in the order they were registered with the pool. The first node with enough
/// free memory wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstFitSelector;

impl FirstFitSelector {
    pub fn new() -> Self {
        Self
    }
}

impl NodeSelector for FirstFitSelector {
    fn candidate_order(&self, pool: &NodePool, _task: &Task) -> Vec<usize> {
        (0..pool.len()).collect()
    }

    fn name(&self) -> &'static str {
        "FirstFit"
    }
}
