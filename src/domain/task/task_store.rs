use slotmap::SlotMap;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::task::task::{Task, TaskDescriptor, TaskKey};
use crate::domain::utils::id::TaskId;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct StoreInner {
    /// Task storage.
    slots: SlotMap<TaskKey, Task>,

    /// Index lookup of the internal key (TaskKey) by the caller supplied id (TaskId).
    name_index: HashMap<TaskId, TaskKey>,
}

/// Registry of every task admitted to a scheduler.
///
/// The store owns the task descriptors and their completion flags. The queues of the
/// scheduler and the nodes only carry [`TaskKey`]s into it. Cloning the store clones the handle.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    /// Both maps are protected with a single lock.
    inner: Arc<RwLock<StoreInner>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and admits a task, resolving its dependency ids to keys.
    ///
    /// # Returns
    /// Returns the TaskKey (internal key for the TaskStore).
    pub fn add(&self, descriptor: &TaskDescriptor) -> Result<TaskKey> {
        descriptor.validate()?;

        let mut guard = self.inner.write().expect("TaskStore lock poisoned");

        if guard.name_index.contains_key(&descriptor.id) {
            return Err(Error::InvalidTaskDescriptor { id: descriptor.id.to_string(), reason: "task id already admitted".to_string() });
        }

        let mut dependencies = Vec::with_capacity(descriptor.dependencies.len());
        for dependency in &descriptor.dependencies {
            match dependency {
                Some(dependency_id) => match guard.name_index.get(dependency_id) {
                    Some(key) => dependencies.push(Some(*key)),
                    None => {
                        return Err(Error::UnknownDependency { task: descriptor.id.to_string(), dependency: dependency_id.to_string() });
                    }
                },
                None => dependencies.push(None),
            }
        }

        let key = guard.slots.insert_with_key(|key| Task::new(key, descriptor, dependencies));
        guard.name_index.insert(descriptor.id.clone(), key);

        Ok(key)
    }

    /// Snapshot of the task stored under `key`.
    pub fn get(&self, key: TaskKey) -> Option<Task> {
        let guard = self.inner.read().expect("TaskStore lock poisoned");
        guard.slots.get(key).cloned()
    }

    pub fn get_key(&self, id: &TaskId) -> Option<TaskKey> {
        let guard = self.inner.read().expect("TaskStore lock poisoned");
        guard.name_index.get(id).copied()
    }

    pub fn get_by_name(&self, id: &TaskId) -> Option<Task> {
        let guard = self.inner.read().expect("TaskStore lock poisoned");
        let key = guard.name_index.get(id)?;
        guard.slots.get(*key).cloned()
    }

    pub fn get_name_for_key(&self, key: TaskKey) -> Option<TaskId> {
        let guard = self.inner.read().expect("TaskStore lock poisoned");
        guard.slots.get(key).map(|task| task.id.clone())
    }

    pub fn is_completed(&self, key: TaskKey) -> bool {
        let guard = self.inner.read().expect("TaskStore lock poisoned");
        guard.slots.get(key).is_some_and(|task| task.is_completed())
    }

    /// Marks the task completed.
    ///
    /// # Returns
    /// `true` only for the call that flipped the flag.
    pub fn mark_completed(&self, key: TaskKey) -> bool {
        let mut guard = self.inner.write().expect("TaskStore lock poisoned");
        guard.slots.get_mut(key).is_some_and(|task| task.mark_completed())
    }

    /// The dependency gate: true iff every present dependency of the task is completed.
    /// Absent slots are skipped without being looked up.
    pub fn dependencies_completed(&self, key: TaskKey) -> bool {
        let guard = self.inner.read().expect("TaskStore lock poisoned");

        let Some(task) = guard.slots.get(key) else {
            return false;
        };

        task.present_dependencies().all(|dependency| guard.slots.get(dependency).is_some_and(|dep| dep.is_completed()))
    }

    /// Keys of all admitted tasks.
    pub fn keys(&self) -> Vec<TaskKey> {
        let guard = self.inner.read().expect("TaskStore lock poisoned");
        guard.slots.keys().collect()
    }

    pub fn len(&self) -> usize {
        let guard = self.inner.read().expect("TaskStore lock poisoned");
        guard.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
