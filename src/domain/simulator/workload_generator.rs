use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::node::node::NodeDescriptor;
use crate::domain::task::task::TaskDescriptor;
use crate::domain::utils::id::TaskId;

pub const NODE_MEMORY: i64 = 100;
pub const NODE_COMPUTE_RATE: f64 = 50.0;

/// Seeded source of random node pools and task sets for demo runs.
///
/// Nodes share memory and compute rate and differ in latency (0.1 s to 0.5 s). Tasks draw
/// complexity from 10..=100, memory from 10..=30 and priority from 1..=5. Each task has one
/// dependency slot that is either absent or names a uniformly chosen earlier task.
#[derive(Debug)]
pub struct WorkloadGenerator {
    rng: StdRng,
}

impl WorkloadGenerator {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn generate_nodes(&mut self, count: usize) -> Vec<NodeDescriptor> {
        (0..count).map(|i| NodeDescriptor::new(format!("Node-{}", i), NODE_MEMORY, NODE_COMPUTE_RATE, self.rng.random_range(0.1..0.5))).collect()
    }

    pub fn generate_tasks(&mut self, count: usize) -> Vec<TaskDescriptor> {
        (0..count)
            .map(|i| {
                let complexity = self.rng.random_range(10..=100) as f64;
                let memory_needed = self.rng.random_range(10..=30);
                let priority = self.rng.random_range(1..=5);

                let dependency = if i > 0 && self.rng.random_bool(0.5) {
                    Some(TaskId::new(format!("Task-{}", self.rng.random_range(0..i))))
                } else {
                    None
                };

                TaskDescriptor::new(format!("Task-{}", i), complexity, memory_needed, priority).with_dependency(dependency)
            })
            .collect()
    }
}
