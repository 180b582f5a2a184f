pub mod logical_simulator;
pub mod simulator;
pub mod workload_generator;
