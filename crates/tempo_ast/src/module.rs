//! The module container: a dense node arena plus the ordered item list.

use crate::ids::NodeId;
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// An elaborated module: the unit of simulation.
///
/// Nodes live in a dense, append-only arena; a `NodeId` is the node's index
/// at allocation time and stays valid for the module's lifetime. `items`
/// lists the top-level declarations and constructs in declaration order —
/// the order the resync driver and output emission observe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDecl {
    /// The module name.
    pub name: String,
    nodes: Vec<Node>,
    items: Vec<NodeId>,
}

impl ModuleDecl {
    /// Creates an empty module with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Allocates a node in the arena and returns its ID.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Returns the node with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID does not belong to this module.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns the number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over `(NodeId, &Node)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::from_raw(i as u32), n))
    }

    /// Registers a node as a top-level module item.
    pub fn push_item(&mut self, id: NodeId) {
        self.items.push(id);
    }

    /// The top-level items in declaration order.
    pub fn items(&self) -> &[NodeId] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_lookup() {
        let mut m = ModuleDecl::new("top");
        let id = m.alloc(Node::Finish { arg: None });
        assert!(matches!(m.node(id), Node::Finish { arg: None }));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn ids_are_sequential() {
        let mut m = ModuleDecl::new("top");
        let a = m.alloc(Node::SeqBlock { stmts: Vec::new() });
        let b = m.alloc(Node::SeqBlock { stmts: Vec::new() });
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
    }

    #[test]
    fn items_preserve_order() {
        let mut m = ModuleDecl::new("top");
        let a = m.alloc(Node::SeqBlock { stmts: Vec::new() });
        let b = m.alloc(Node::SeqBlock { stmts: Vec::new() });
        m.push_item(b);
        m.push_item(a);
        assert_eq!(m.items(), &[b, a]);
    }

    #[test]
    fn iter_visits_all() {
        let mut m = ModuleDecl::new("top");
        m.alloc(Node::SeqBlock { stmts: Vec::new() });
        m.alloc(Node::Finish { arg: None });
        assert_eq!(m.iter().count(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let mut m = ModuleDecl::new("top");
        let id = m.alloc(Node::Finish { arg: None });
        m.push_item(id);
        let json = serde_json::to_string(&m).unwrap();
        let restored: ModuleDecl = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.name, "top");
        assert_eq!(restored.items().len(), 1);
    }
}
