pub mod node;
pub mod node_pool;
