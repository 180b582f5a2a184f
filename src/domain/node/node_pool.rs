use std::collections::HashMap;

use crate::domain::node::node::{Node, NodeDescriptor};
use crate::domain::utils::id::NodeId;
use crate::error::{Error, Result};

/// The fixed, ordered set of nodes a scheduler places tasks on.
///
/// Pool order is the registration order and is the scan order of first-fit placement.
#[derive(Debug)]
pub struct NodePool {
    nodes: Vec<Node>,

    /// Index lookup of a node position by its id.
    index: HashMap<NodeId, usize>,
}

impl NodePool {
    pub fn new(descriptors: Vec<NodeDescriptor>) -> Result<Self> {
        if descriptors.is_empty() {
            return Err(Error::EmptyNodePool);
        }

        let mut nodes = Vec::with_capacity(descriptors.len());
        let mut index = HashMap::with_capacity(descriptors.len());

        for descriptor in descriptors {
            if index.contains_key(&descriptor.id) {
                return Err(Error::InvalidNodeDescriptor { id: descriptor.id.to_string(), reason: "node id registered twice".to_string() });
            }

            index.insert(descriptor.id.clone(), nodes.len());
            nodes.push(Node::new(descriptor)?);
        }

        log::debug!("NodePool created with {} nodes.", nodes.len());

        Ok(Self { nodes, index })
    }

    pub fn get(&self, position: usize) -> Option<&Node> {
        self.nodes.get(position)
    }

    pub fn get_by_id(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).and_then(|position| self.nodes.get(*position))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get_total_capacity(&self) -> i64 {
        self.nodes.iter().map(|node| node.total_memory).sum()
    }

    pub fn get_used_memory(&self) -> i64 {
        self.nodes.iter().map(|node| node.used_memory()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_keeps_registration_order_and_rejects_duplicates() {
        let pool = NodePool::new(vec![NodeDescriptor::new("Node-0", 100, 50.0, 0.1), NodeDescriptor::new("Node-1", 50, 20.0, 0.0)]).unwrap();

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(0).unwrap().id, NodeId::new("Node-0"));
        assert_eq!(pool.get_by_id(&NodeId::new("Node-1")).unwrap().total_memory, 50);
        assert_eq!(pool.get_total_capacity(), 150);

        let duplicate = NodePool::new(vec![NodeDescriptor::new("Node-0", 100, 50.0, 0.1), NodeDescriptor::new("Node-0", 100, 50.0, 0.1)]);
        assert!(matches!(duplicate, Err(Error::InvalidNodeDescriptor { .. })));

        assert!(matches!(NodePool::new(Vec::new()), Err(Error::EmptyNodePool)));
    }
}
