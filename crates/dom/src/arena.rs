//! Arena-based DOM tree storage
//!
//! Nodes live in one `Vec` and refer to each other by `NodeId` index.
//! Nothing outside the arena owns a node: callers hold ids, which stay
//! valid for the arena's lifetime even after a node is unlinked.
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};
use ahash::AHashMap;

/// Arena allocator for DOM nodes
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// Backend node ID → NodeId lookup (CDP layout data uses backend IDs)
    backend_id_map: AHashMap<u32, NodeId>,

    /// Root node ID (if set)
    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            backend_id_map: AHashMap::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Add a node to the arena, returns its ID.
    ///
    /// The node's `node_id` is rewritten to its arena index.
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        if node.backend_node_id != 0 {
            self.backend_id_map.insert(node.backend_node_id, node_id);
        }
        self.nodes.push(node);
        node_id
    }

    /// Add a node and link it as the last child of `parent_id`
    pub fn append_child(&mut self, parent_id: NodeId, mut node: DomNode) -> Result<NodeId> {
        self.get(parent_id)?;
        node.parent_id = Some(parent_id);
        let child_id = self.add_node(node);
        self.get_mut(parent_id)?.children_ids.push(child_id);
        Ok(child_id)
    }

    /// Unlink a node from its parent. The node stays in the arena but is
    /// no longer reachable by traversal from the root.
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        let parent_id = self.get_mut(node_id)?.parent_id.take();
        if let Some(parent_id) = parent_id {
            self.get_mut(parent_id)?
                .children_ids
                .retain(|child| *child != node_id);
        }
        Ok(())
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node ID by backend node ID
    pub fn get_node_id_by_backend(&self, backend_id: u32) -> Option<NodeId> {
        self.backend_id_map.get(&backend_id).copied()
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        // Verify node exists
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Traverse tree depth-first (iterative, no recursion).
    ///
    /// Visits nodes in document order.
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Collect ids of attached nodes matching predicate, in document order
    pub fn find_in_order<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        let mut found = Vec::new();
        if let Some(root_id) = self.root_id {
            let _ = self.traverse_df(root_id, |node| {
                if predicate(node) {
                    found.push(node.node_id);
                }
                Ok(())
            });
        }
        found
    }

    /// Find first attached element with the given tag name
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find_in_order(|node| {
            node.node_type == NodeType::Element && node.node_name.eq_ignore_ascii_case(tag)
        })
        .first()
        .copied()
    }

    /// Find element by ID attribute
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_in_order(|node| node.is_element() && node.attr("id") == Some(id))
            .first()
            .copied()
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.backend_id_map.clear();
        self.root_id = None;
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (DomArena, NodeId) {
        let mut arena = DomArena::new();
        let root = arena.add_node(DomNode::new(0, 1, NodeType::Document, "#document".into()));
        arena.set_root(root).unwrap();
        (arena, root)
    }

    #[test]
    fn test_add_node_assigns_index() {
        let mut arena = DomArena::new();
        let id = arena.add_node(DomNode::new(42, 100, NodeType::Element, "DIV".into()));

        assert_eq!(id, 0);
        let node = arena.get(id).unwrap();
        assert_eq!(node.node_id, 0);
        assert_eq!(node.backend_node_id, 100);
        assert_eq!(arena.get_node_id_by_backend(100), Some(0));
    }

    #[test]
    fn test_document_order() {
        let (mut arena, root) = tree();
        let div = arena.append_child(root, DomNode::element("div")).unwrap();
        let a1 = arena.append_child(div, DomNode::element("a")).unwrap();
        let a2 = arena.append_child(root, DomNode::element("a")).unwrap();
        let a3 = arena.append_child(div, DomNode::element("a")).unwrap();

        let links = arena.find_in_order(|n| n.node_name == "A");
        assert_eq!(links, vec![a1, a3, a2]);
    }

    #[test]
    fn test_detach_hides_subtree() {
        let (mut arena, root) = tree();
        let div = arena.append_child(root, DomNode::element("div").with_attr("id", "box")).unwrap();
        assert_eq!(arena.find_by_id("box"), Some(div));

        arena.detach(div).unwrap();
        assert_eq!(arena.find_by_id("box"), None);
        assert!(arena.get(root).unwrap().children_ids.is_empty());
        // Still addressable by id
        assert!(arena.get(div).is_ok());
    }

    #[test]
    fn test_missing_node() {
        let arena = DomArena::new();
        assert!(matches!(arena.get(7), Err(DomError::NodeNotFound(7))));
    }
}
