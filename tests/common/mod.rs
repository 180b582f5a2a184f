#![allow(dead_code)]

use std::sync::Arc;

use grid_task_scheduler::domain::node::node::NodeDescriptor;
use grid_task_scheduler::domain::scheduler::schedule_event::{ScheduleEvent, ScheduleEventKind};
use grid_task_scheduler::domain::scheduler::scheduler::{Scheduler, TaskState};
use grid_task_scheduler::domain::simulator::logical_simulator::LogicalSimulator;
use grid_task_scheduler::domain::utils::id::{NodeId, TaskId};

pub type Outcome = (ScheduleEventKind, TaskId, Option<NodeId>);

pub fn logical_scheduler(nodes: Vec<NodeDescriptor>) -> (Scheduler, Arc<LogicalSimulator>) {
    let simulator = Arc::new(LogicalSimulator::new());
    let scheduler = Scheduler::with_nodes(nodes, simulator.clone()).expect("valid node pool");
    (scheduler, simulator)
}

pub fn node(id: &str, total_memory: i64) -> NodeDescriptor {
    NodeDescriptor::new(id, total_memory, 50.0, 0.1)
}

pub fn outcomes(events: &[ScheduleEvent]) -> Vec<Outcome> {
    events.iter().map(ScheduleEvent::outcome).collect()
}

pub fn scheduled(task: &str, node: &str) -> Outcome {
    (ScheduleEventKind::Scheduled, TaskId::new(task), Some(NodeId::new(node)))
}

pub fn completed(task: &str, node: &str) -> Outcome {
    (ScheduleEventKind::Completed, TaskId::new(task), Some(NodeId::new(node)))
}

pub fn waiting(task: &str) -> Outcome {
    (ScheduleEventKind::Waiting, TaskId::new(task), None)
}

pub fn unschedulable(task: &str) -> Outcome {
    (ScheduleEventKind::Unschedulable, TaskId::new(task), None)
}

/// Capacity invariant on every node and single ownership for every admitted task.
pub fn assert_invariants(scheduler: &Scheduler) {
    for node in scheduler.nodes().iter() {
        assert!(node.ledger_is_consistent(), "ledger of node {} is inconsistent", node.id);
        assert!(node.used_memory() <= node.total_memory);
    }

    let store = scheduler.task_store();
    for key in store.keys() {
        let id = store.get_name_for_key(key).unwrap();
        let holders = scheduler.nodes().iter().filter(|node| node.holds(key)).count();
        let pending = usize::from(scheduler.task_state(&id) == Some(TaskState::Pending));

        assert!(holders + pending <= 1, "task {} is owned by {} containers", id, holders + pending);
    }
}
