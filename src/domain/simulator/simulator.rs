use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::api::scheduler_dto::SimulatorDto;
use crate::domain::simulator::logical_simulator::LogicalSimulator;

/// Source of time for task execution.
///
/// `sleep` is the only point where a node suspends while running a task. Implementations
/// must only suspend the calling future, never the executor thread.
#[async_trait]
pub trait SystemSimulator: std::fmt::Debug + Send + Sync {
    fn get_current_time_in_ms(&self) -> i64;

    fn get_current_time_in_s(&self) -> i64 {
        self.get_current_time_in_ms() / 1000
    }

    async fn sleep(&self, duration: Duration);
}

/// Wall clock simulator backed by the tokio timer.
///
/// Time is reported relative to the creation of the simulator.
#[derive(Debug, Clone)]
pub struct Simulator {
    base: Instant,
}

impl Simulator {
    pub fn new() -> Self {
        Self { base: Instant::now() }
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemSimulator for Simulator {
    fn get_current_time_in_ms(&self) -> i64 {
        i64::try_from(self.base.elapsed().as_millis()).unwrap_or(i64::MAX)
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Picks the clock described by the configuration.
pub fn simulator_from_dto(dto: &SimulatorDto) -> Arc<dyn SystemSimulator> {
    if dto.is_simulation {
        Arc::new(LogicalSimulator::new())
    } else {
        Arc::new(Simulator::new())
    }
}
