use std::fmt::Debug;
use std::str::FromStr;

use crate::domain::node::node_pool::NodePool;
use crate::domain::scheduler::selector::{best_fit::BestFitSelector, first_fit::FirstFitSelector, least_loaded::LeastLoadedSelector};
use crate::domain::task::task::Task;
use crate::error::ConversionError;

/// Placement policy of a scheduler.
///
/// A selector only decides the order in which nodes are tried. The scheduler walks that
/// order and keeps the first node whose `allocate` succeeds, so a stale snapshot inside a
/// selector can never break the capacity invariant.
pub trait NodeSelector: Debug + Send + Sync {
    /// Pool positions in the order placement should attempt them.
    fn candidate_order(&self, pool: &NodePool, task: &Task) -> Vec<usize>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorType {
    #[default]
    FirstFit,
    BestFit,
    LeastLoaded,
}

impl FromStr for SelectorType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FirstFit" => Ok(SelectorType::FirstFit),
            "BestFit" => Ok(SelectorType::BestFit),
            "LeastLoaded" => Ok(SelectorType::LeastLoaded),
            _ => Err(ConversionError::UnknownSelectorType(s.to_string())),
        }
    }
}

impl SelectorType {
    pub fn get_instance(&self) -> Box<dyn NodeSelector> {
        match self {
            SelectorType::FirstFit => Box::new(FirstFitSelector::new()),
            SelectorType::BestFit => Box::new(BestFitSelector::new()),
            SelectorType::LeastLoaded => Box::new(LeastLoadedSelector::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::node::NodeDescriptor;
    use crate::domain::task::task::TaskDescriptor;
    use crate::domain::task::task_store::TaskStore;

    fn setup() -> (NodePool, TaskStore) {
        let pool = NodePool::new(vec![
            NodeDescriptor::new("Node-0", 100, 50.0, 0.0),
            NodeDescriptor::new("Node-1", 100, 50.0, 0.0),
            NodeDescriptor::new("Node-2", 40, 50.0, 0.0),
        ])
        .unwrap();
        (pool, TaskStore::new())
    }

    fn task(store: &TaskStore, id: &str, memory: i64) -> Task {
        let key = store.add(&TaskDescriptor::new(id, 10.0, memory, 1)).unwrap();
        store.get(key).unwrap()
    }

    #[test]
    fn selector_type_parses_known_names() {
        assert_eq!(SelectorType::from_str("BestFit"), Ok(SelectorType::BestFit));
        assert_eq!(SelectorType::from_str("LeastLoaded").unwrap().get_instance().name(), "LeastLoaded");
        assert_eq!(SelectorType::from_str("RoundRobin"), Err(ConversionError::UnknownSelectorType("RoundRobin".to_string())));
    }

    #[test]
    fn first_fit_uses_pool_order() {
        let (pool, store) = setup();
        let t = task(&store, "t", 10);

        assert_eq!(FirstFitSelector::new().candidate_order(&pool, &t), vec![0, 1, 2]);
    }

    #[test]
    fn best_fit_prefers_tightest_node_and_moves_misfits_last() {
        let (pool, store) = setup();
        let filler = task(&store, "filler", 70);
        pool.get(1).unwrap().allocate(&filler);

        let small = task(&store, "small", 25);
        assert_eq!(BestFitSelector::new().candidate_order(&pool, &small), vec![1, 2, 0]);

        let big = task(&store, "big", 50);
        assert_eq!(BestFitSelector::new().candidate_order(&pool, &big), vec![0, 1, 2]);
    }

    #[test]
    fn least_loaded_orders_by_utilization() {
        let (pool, store) = setup();
        pool.get(0).unwrap().allocate(&task(&store, "a", 50));
        pool.get(2).unwrap().allocate(&task(&store, "b", 10));

        let t = task(&store, "t", 10);
        assert_eq!(LeastLoadedSelector::new().candidate_order(&pool, &t), vec![1, 2, 0]);
    }
}
