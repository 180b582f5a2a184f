pub mod blocked_policy;
pub mod event_log;
pub mod node_selector;
pub mod pending_queue;
pub mod schedule_event;
pub mod scheduler;
pub mod selector;
