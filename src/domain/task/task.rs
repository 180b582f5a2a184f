use std::time::Duration;

use slotmap::new_key_type;

use crate::domain::utils::id::TaskId;
use crate::error::{Error, Result};

new_key_type! {
    /// Internal key of an admitted task inside the [`TaskStore`](super::task_store::TaskStore).
    pub struct TaskKey;
}

/// Description of a task as handed over by the caller.
///
/// Dependencies name previously admitted tasks. A `None` slot is an absent dependency and
/// never blocks the task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDescriptor {
    pub id: TaskId,

    /// Abstract compute units. Must be positive.
    pub complexity: f64,

    /// Memory units the task occupies on a node while it is held there. Must be positive.
    pub memory_needed: i64,

    /// Lower value is served first.
    pub priority: i64,

    pub dependencies: Vec<Option<TaskId>>,
}

impl TaskDescriptor {
    pub fn new(id: impl Into<String>, complexity: f64, memory_needed: i64, priority: i64) -> Self {
        Self { id: TaskId::new(id), complexity, memory_needed, priority, dependencies: Vec::new() }
    }

    pub fn with_dependency(mut self, dependency: Option<TaskId>) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Rejects descriptors that would produce zero, negative or undefined durations and footprints.
    pub fn validate(&self) -> Result<()> {
        if !self.complexity.is_finite() || self.complexity <= 0.0 {
            return Err(self.invalid(format!("complexity must be positive, got {}", self.complexity)));
        }

        if self.memory_needed <= 0 {
            return Err(self.invalid(format!("memory_needed must be positive, got {}", self.memory_needed)));
        }

        Ok(())
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidTaskDescriptor { id: self.id.to_string(), reason }
    }
}

/// An admitted task.
///
/// Everything except the completion flag is fixed at admission. Completion is monotonic.
#[derive(Debug, Clone)]
pub struct Task {
    pub key: TaskKey,
    pub id: TaskId,
    pub complexity: f64,
    pub memory_needed: i64,
    pub priority: i64,

    /// Resolved dependency slots, `None` marks an absent dependency.
    pub dependencies: Vec<Option<TaskKey>>,

    completed: bool,
}

impl Task {
    pub(crate) fn new(key: TaskKey, descriptor: &TaskDescriptor, dependencies: Vec<Option<TaskKey>>) -> Self {
        Self {
            key,
            id: descriptor.id.clone(),
            complexity: descriptor.complexity,
            memory_needed: descriptor.memory_needed,
            priority: descriptor.priority,
            dependencies,
            completed: false,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Sets the completion flag.
    ///
    /// # Returns
    /// `true` if this call performed the transition, `false` if the task was already completed.
    pub(crate) fn mark_completed(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        true
    }

    /// Time the task occupies a node with the given throughput: `complexity / compute_rate + latency`.
    ///
    /// Saturates at `Duration::MAX` when the quotient does not fit into a `Duration`.
    pub fn execution_time(&self, compute_rate: f64, latency: f64) -> Duration {
        Duration::try_from_secs_f64(self.complexity / compute_rate + latency).unwrap_or(Duration::MAX)
    }

    /// Present dependency keys, skipping absent slots.
    pub fn present_dependencies(&self) -> impl Iterator<Item = TaskKey> + '_ {
        self.dependencies.iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn validate_rejects_non_positive_values() {
        assert!(TaskDescriptor::new("ok", 10.0, 5, 1).validate().is_ok());

        let zero_complexity = TaskDescriptor::new("t", 0.0, 5, 1).validate();
        assert!(matches!(zero_complexity, Err(Error::InvalidTaskDescriptor { .. })));

        let nan_complexity = TaskDescriptor::new("t", f64::NAN, 5, 1).validate();
        assert!(matches!(nan_complexity, Err(Error::InvalidTaskDescriptor { .. })));

        let negative_memory = TaskDescriptor::new("t", 1.0, -3, 1).validate();
        assert!(matches!(negative_memory, Err(Error::InvalidTaskDescriptor { .. })));
    }

    #[test]
    fn completion_is_monotonic() {
        let mut keys: SlotMap<TaskKey, ()> = SlotMap::with_key();
        let key = keys.insert(());
        let mut task = Task::new(key, &TaskDescriptor::new("t", 10.0, 5, 1), vec![None]);

        assert!(!task.is_completed());
        assert!(task.mark_completed());
        assert!(!task.mark_completed());
        assert!(task.is_completed());
    }

    #[test]
    fn execution_time_adds_latency_to_compute_time() {
        let mut keys: SlotMap<TaskKey, ()> = SlotMap::with_key();
        let key = keys.insert(());
        let task = Task::new(key, &TaskDescriptor::new("t", 50.0, 5, 1), Vec::new());

        assert_eq!(task.execution_time(50.0, 0.25), Duration::from_millis(1250));
        assert_eq!(task.present_dependencies().count(), 0);
    }

    #[test]
    fn execution_time_saturates_for_tiny_compute_rates() {
        let mut keys: SlotMap<TaskKey, ()> = SlotMap::with_key();
        let key = keys.insert(());
        let task = Task::new(key, &TaskDescriptor::new("t", 1e10, 10, 1), Vec::new());

        assert_eq!(task.execution_time(1e-10, 0.0), Duration::MAX);
        assert_eq!(task.execution_time(f64::MIN_POSITIVE, 0.0), Duration::MAX);
    }
}
