use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::simulator::simulator::SystemSimulator;

#[derive(Debug, Default)]
struct LogicalState {
    now: Duration,
    delays: Vec<Duration>,
}

/// Simulator that never waits.
///
/// Each `sleep` advances the virtual clock by the requested delay and returns at once, so the
/// clock reads the sum of all delays as if they had run back to back, saturating at
/// `Duration::MAX`. Every delay is recorded.
#[derive(Debug, Default)]
pub struct LogicalSimulator {
    state: Mutex<LogicalState>,
}

impl LogicalSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All delays requested so far, in request order.
    pub fn recorded_delays(&self) -> Vec<Duration> {
        self.state.lock().expect("LogicalSimulator lock poisoned").delays.clone()
    }

    pub fn elapsed(&self) -> Duration {
        self.state.lock().expect("LogicalSimulator lock poisoned").now
    }
}

#[async_trait]
impl SystemSimulator for LogicalSimulator {
    fn get_current_time_in_ms(&self) -> i64 {
        i64::try_from(self.elapsed().as_millis()).unwrap_or(i64::MAX)
    }

    async fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock().expect("LogicalSimulator lock poisoned");
        state.now = state.now.saturating_add(duration);
        state.delays.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sleep_advances_virtual_time_without_waiting() {
        let simulator = LogicalSimulator::new();

        simulator.sleep(Duration::from_millis(700)).await;
        simulator.sleep(Duration::from_millis(800)).await;

        assert_eq!(simulator.get_current_time_in_ms(), 1500);
        assert_eq!(simulator.recorded_delays(), vec![Duration::from_millis(700), Duration::from_millis(800)]);
    }
}
