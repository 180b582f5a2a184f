use serde::{Deserialize, Serialize};

use crate::domain::node::node::NodeDescriptor;
use crate::domain::task::task::TaskDescriptor;
use crate::domain::utils::id::TaskId;

/// Root of a scheduler configuration file.
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerDto {
    #[serde(default = "default_selector_type")]
    pub selector_type: String,

    #[serde(default = "default_blocked_policy")]
    pub blocked_policy: String,

    #[serde(default)]
    pub simulator: SimulatorDto,

    pub nodes: Vec<NodeDto>,

    #[serde(default)]
    pub tasks: Vec<TaskDto>,
}

fn default_selector_type() -> String {
    "FirstFit".to_string()
}

fn default_blocked_policy() -> String {
    "OnDependencyCompletion".to_string()
}

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorDto {
    /// `true` runs on virtual time, `false` waits for real.
    pub is_simulation: bool,
}

impl Default for SimulatorDto {
    fn default() -> Self {
        Self { is_simulation: true }
    }
}

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDto {
    pub id: String,
    pub total_memory: i64,
    pub compute_rate: f64,
    #[serde(default)]
    pub latency: f64,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: String,
    pub complexity: f64,
    pub memory_needed: i64,
    pub priority: i64,

    /// `null` entries are absent dependency slots.
    #[serde(default)]
    pub dependencies: Vec<Option<String>>,
}

impl From<NodeDto> for NodeDescriptor {
    fn from(dto: NodeDto) -> Self {
        NodeDescriptor::new(dto.id, dto.total_memory, dto.compute_rate, dto.latency)
    }
}

impl From<TaskDto> for TaskDescriptor {
    fn from(dto: TaskDto) -> Self {
        TaskDescriptor {
            id: TaskId::new(dto.id),
            complexity: dto.complexity,
            memory_needed: dto.memory_needed,
            priority: dto.priority,
            dependencies: dto.dependencies.into_iter().map(|dependency| dependency.map(TaskId::new)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_minimal_document() {
        let json = r#"{
            "nodes": [ { "id": "Node-0", "totalMemory": 100, "computeRate": 50.0 } ],
            "tasks": [ { "id": "Task-0", "complexity": 20.0, "memoryNeeded": 10, "priority": 2, "dependencies": [null] } ]
        }"#;

        let dto: SchedulerDto = serde_json::from_str(json).unwrap();

        assert_eq!(dto.selector_type, "FirstFit");
        assert_eq!(dto.blocked_policy, "OnDependencyCompletion");
        assert!(dto.simulator.is_simulation);
        assert_eq!(dto.nodes[0].latency, 0.0);

        let task: TaskDescriptor = dto.tasks[0].clone().into();
        assert_eq!(task.dependencies, vec![None]);
    }
}
