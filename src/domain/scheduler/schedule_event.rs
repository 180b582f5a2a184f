use serde::Serialize;
use std::fmt;

use crate::domain::utils::id::{NodeId, TaskId};

/// What happened to a task during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScheduleEventKind {
    /// The task was placed into a node's local queue.
    Scheduled,

    /// The dependency gate failed. The task moved to the blocked list.
    Waiting,

    /// No node had room for the task. The task was dropped.
    Unschedulable,

    /// The task ran on a node and its memory was released.
    Completed,

    /// The post-completion capacity check failed and the task was booked on another node.
    Reassigned,

    /// The post-completion capacity check failed and no node could take the task.
    Unassignable,

    /// Execution was interrupted by shutdown. The task went back to the head of its node queue.
    Cancelled,
}

impl ScheduleEventKind {
    /// Whether the event reports a condition the scheduler could not resolve.
    pub fn is_failure(&self) -> bool {
        matches!(self, ScheduleEventKind::Unschedulable | ScheduleEventKind::Unassignable)
    }
}

impl fmt::Display for ScheduleEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEvent {
    /// Position in the event log of the emitting scheduler, starting at 0.
    pub sequence: u64,
    pub kind: ScheduleEventKind,
    pub task_id: TaskId,
    pub node_id: Option<NodeId>,
}

impl ScheduleEvent {
    /// The event without its sequence number, for comparing the outcome of two runs.
    pub fn outcome(&self) -> (ScheduleEventKind, TaskId, Option<NodeId>) {
        (self.kind, self.task_id.clone(), self.node_id.clone())
    }
}

impl fmt::Display for ScheduleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node_id.as_ref().map(|id| id.to_string()).unwrap_or_default();

        match self.kind {
            ScheduleEventKind::Scheduled => write!(f, "Task {} scheduled on Node {}", self.task_id, node),
            ScheduleEventKind::Waiting => write!(f, "Task {} waiting for dependencies", self.task_id),
            ScheduleEventKind::Unschedulable => write!(f, "Task {} could not be scheduled (no available resources)", self.task_id),
            ScheduleEventKind::Completed => write!(f, "Task {} completed on Node {}", self.task_id, node),
            ScheduleEventKind::Reassigned => write!(f, "Task {} reassigned to Node {}", self.task_id, node),
            ScheduleEventKind::Unassignable => write!(f, "Task {} could not be reassigned to any node", self.task_id),
            ScheduleEventKind::Cancelled => write!(f, "Task {} cancelled on Node {}", self.task_id, node),
        }
    }
}
