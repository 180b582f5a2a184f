pub mod node;
pub mod scheduler;
pub mod simulator;
pub mod task;
pub mod utils;
